//! Leeway Hardware Abstraction Layer
//!
//! Serial traits the NMEA0183 engine is written against. Board crates
//! implement them for their UART peripherals; host tests implement them
//! for byte slices.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Instrument bus (NMEA0183, 4800 baud)   │
//! └─────────────────────────────────────────┘
//!                     │ UartRx
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  leeway-core engine                     │
//! └─────────────────────────────────────────┘
//!                     │ UartTx
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  Display / chart plotter                │
//! └─────────────────────────────────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod uart;

pub use uart::{Uart, UartConfig, UartRx, UartTx};
