//! PIO programs of the Bitstream Generator and the Master Clock Generator.
//!
//! Assembled here, installed by `hw::pio`. Kept free of the HAL so their
//! timing can be checked on the host.
//!
//! `tdm` side-set bit 0 drives BCLK, bit 1 drives FS. Every bit takes
//! [`PIO_CYCLES_PER_BIT`](crate::constants::PIO_CYCLES_PER_BIT) cycles: data
//! out with BCLK low for two, then sample and BCLK high for two. The first
//! bit of a frame raises FS and reloads the loop counter from `y`, which
//! holds [`TdmConfig::frame_counter`](crate::config::TdmConfig::frame_counter)
//! pulled once before the first frame.

use pio::Program;

/// Bitstream Generator: one frame per wrap.
pub fn tdm() -> Program<32> {
    pio_proc::pio_asm!(
        ".side_set 2",
        "    out y, 32        side 0b00",
        ".wrap_target",
        "    out pins, 1      side 0b10 [1]",
        "    in pins, 1       side 0b11",
        "    mov x, y         side 0b11",
        "bitloop:",
        "    out pins, 1      side 0b00 [1]",
        "    in pins, 1       side 0b01",
        "    jmp x-- bitloop  side 0b01",
        ".wrap"
    )
    .program
}

/// Master Clock Generator: one MCLK period every
/// [`PIO_CYCLES_PER_MCLK`](crate::constants::PIO_CYCLES_PER_MCLK) cycles.
pub fn mclk() -> Program<32> {
    pio_proc::pio_asm!(
        ".side_set 1",
        ".wrap_target",
        "    nop side 1 [1]",
        "    nop side 0 [1]",
        ".wrap"
    )
    .program
}
