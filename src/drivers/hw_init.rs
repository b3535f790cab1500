//! One-shot peripheral initialization and raw pin access.
//!
//! Configures the ADC channel and GPIO directions using raw ESP-IDF sys
//! calls, and exposes the handful of register-level helpers the board
//! adapter needs. Called once from `main()` before any task starts.
//!
//! On the host, every helper reads from or writes to static atomics so
//! tests can inject input levels and observe outputs.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::app::ports::Pin;
#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before any task is spawned.
    unsafe {
        init_adc()?;
        init_gpio(&pins::INPUT_PINS, gpio_mode_t_GPIO_MODE_INPUT)?;
        init_gpio(&pins::OUTPUT_PINS, gpio_mode_t_GPIO_MODE_OUTPUT)?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: pins::ANALOGUE_ADC_UNIT - 1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    // SAFETY: handle initialised just above.
    let ret = unsafe { adc_oneshot_config_channel(ADC_HANDLE, pins::ANALOGUE_ADC_CHANNEL, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!(
        "hw_init: ADC{} CH{} configured (12-bit)",
        pins::ANALOGUE_ADC_UNIT,
        pins::ANALOGUE_ADC_CHANNEL
    );
    Ok(())
}

/// Raw 12-bit reading of the analogue input; 0 on driver error.
#[cfg(target_os = "espidf")]
pub fn adc_read() -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: ADC_HANDLE is written once during init_adc() before any task
    // runs; only the analogue-sample task reads the channel.
    let ret = unsafe { adc_oneshot_read(ADC_HANDLE, pins::ANALOGUE_ADC_CHANNEL, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio(gpio_pins: &[Pin], mode: gpio_mode_t) -> Result<(), HwInitError> {
    for &pin in gpio_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        if mode == gpio_mode_t_GPIO_MODE_OUTPUT {
            unsafe { gpio_set_level(pin, 0) };
        }
    }
    info!("hw_init: {} GPIO(s) configured as mode {}", gpio_pins.len(), mode);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: Pin) -> bool {
    // SAFETY: read-only register access on an already-configured input.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: Pin, high: bool) {
    // SAFETY: single register write on an already-configured output; each
    // output pin is driven by exactly one task.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

/// Busy-wait without yielding to the scheduler.
#[cfg(target_os = "espidf")]
pub fn delay_us(us: u32) {
    // SAFETY: ROM busy-loop, no shared state.
    unsafe { esp_rom_delay_us(us) };
}

#[cfg(target_os = "espidf")]
pub fn pulse_in(pin: Pin, high: bool, timeout_us: u32) -> u32 {
    // SAFETY: esp_timer_get_time is a monotonic counter read.
    measure_pulse(|| gpio_read(pin), || unsafe { esp_timer_get_time() }, high, timeout_us)
}

// ── Pulse timing ──────────────────────────────────────────────

/// Length in µs of the next complete pulse at `high`, or 0 on timeout.
///
/// Waits out any pulse already in progress, then for the leading edge,
/// then times the pulse until the trailing edge. `timeout_us` bounds the
/// whole measurement from the moment of the call.
pub fn measure_pulse(
    mut read: impl FnMut() -> bool,
    mut now_us: impl FnMut() -> i64,
    high: bool,
    timeout_us: u32,
) -> u32 {
    let deadline = now_us() + i64::from(timeout_us);

    while read() == high {
        if now_us() >= deadline {
            return 0;
        }
    }
    while read() != high {
        if now_us() >= deadline {
            return 0;
        }
    }
    let start = now_us();
    while read() == high {
        if now_us() >= deadline {
            return 0;
        }
    }
    (now_us() - start).clamp(0, i64::from(u32::MAX)) as u32
}

// ── Simulation ────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicU16, AtomicU32, AtomicU64, Ordering};

    use crate::app::ports::Pin;

    static SIM_INPUTS: AtomicU64 = AtomicU64::new(0);
    static SIM_OUTPUTS: AtomicU64 = AtomicU64::new(0);
    static SIM_ANALOGUE: AtomicU16 = AtomicU16::new(0);
    static SIM_PULSE_US: AtomicU32 = AtomicU32::new(0);

    fn bit(pin: Pin) -> u64 {
        1u64 << (pin as u32 & 63)
    }

    fn set_bit(cell: &AtomicU64, pin: Pin, high: bool) {
        if high {
            cell.fetch_or(bit(pin), Ordering::Relaxed);
        } else {
            cell.fetch_and(!bit(pin), Ordering::Relaxed);
        }
    }

    /// Inject the level seen on a digital input.
    pub fn sim_set_input(pin: Pin, high: bool) {
        set_bit(&SIM_INPUTS, pin, high);
    }

    /// Inject the raw analogue reading.
    pub fn sim_set_analogue(raw: u16) {
        SIM_ANALOGUE.store(raw, Ordering::Relaxed);
    }

    /// Inject the half-period returned by the next pulse measurements.
    pub fn sim_set_pulse_us(us: u32) {
        SIM_PULSE_US.store(us, Ordering::Relaxed);
    }

    /// Last level driven on an output.
    pub fn sim_output(pin: Pin) -> bool {
        SIM_OUTPUTS.load(Ordering::Relaxed) & bit(pin) != 0
    }

    pub fn gpio_read(pin: Pin) -> bool {
        SIM_INPUTS.load(Ordering::Relaxed) & bit(pin) != 0
    }

    pub fn gpio_write(pin: Pin, high: bool) {
        set_bit(&SIM_OUTPUTS, pin, high);
    }

    pub fn adc_read() -> u16 {
        SIM_ANALOGUE.load(Ordering::Relaxed)
    }

    pub fn delay_us(us: u32) {
        std::thread::sleep(core::time::Duration::from_micros(u64::from(us)));
    }

    /// A simulated pulse longer than the timeout is reported as a timeout.
    pub fn pulse_in(_pin: Pin, _high: bool, timeout_us: u32) -> u32 {
        let us = SIM_PULSE_US.load(Ordering::Relaxed);
        if us > timeout_us { 0 } else { us }
    }
}

#[cfg(not(target_os = "espidf"))]
pub use sim::*;
