//! AVR serial programming instruction set
//!
//! Every ISP operation is a fixed 4-byte frame clocked out MSB-first, byte 0
//! first. While a frame is shifted out the target shifts back the bytes it
//! received one slot earlier, so acknowledgements show up in later response
//! slots (programming enable echoes 0x53 in the third response byte).

pub mod frame;
pub mod opcodes;

pub use frame::IspFrame;
