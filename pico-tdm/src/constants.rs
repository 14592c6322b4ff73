/// Words per DMA block: one 32-bit word per TDM slot, one frame per block.
pub const SAMPLE_BUF_SIZE: usize = 8;

/// Width of one TDM slot and of every FIFO word.
pub const WORD_BITS: u32 = 32;

/// Number of DMA channels on the RP2040.
pub const DMA_CHANNEL_COUNT: u8 = 12;

/// User GPIOs on the RP2040 (GPIO0..=GPIO29).
pub const GPIO_COUNT: u8 = 30;

/// PIO cycles the `tdm` program spends on one bit.
pub const PIO_CYCLES_PER_BIT: u32 = 4;

/// PIO cycles per master clock period in the `tdm_mclk` program.
pub const PIO_CYCLES_PER_MCLK: u32 = 4;

/// System clock the default configuration is computed for.
pub const DEFAULT_SYS_CLOCK_HZ: u32 = 128_000_000;
