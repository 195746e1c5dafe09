//! CAN-bus controller frames
//!
//! Frames arrive in the Linux SocketCAN `struct can_frame` layout:
//!
//! | bytes | field                      |
//! |-------|----------------------------|
//! | 0..4  | `can_id`, little-endian    |
//! | 4     | `can_dlc`, payload length  |
//! | 5..8  | padding                    |
//! | 8..16 | payload                    |

use super::action::RawInput;

/// Size of a classic CAN frame on the wire
pub const CAN_FRAME_SIZE: usize = 16;

/// Extended frame format flag
pub const CAN_EFF_FLAG: u32 = 0x8000_0000;
/// Remote transmission request flag
pub const CAN_RTR_FLAG: u32 = 0x4000_0000;
/// Error frame flag
pub const CAN_ERR_FLAG: u32 = 0x2000_0000;
/// Standard frame identifier mask
pub const CAN_SFF_MASK: u32 = 0x0000_07FF;
/// Extended frame identifier mask
pub const CAN_EFF_MASK: u32 = 0x1FFF_FFFF;

/// Error type for frame decoding
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanError {
    #[error("CAN frame too short: {0} bytes")]
    Truncated(usize),
    #[error("CAN payload length {0} exceeds 8")]
    BadLength(u8),
}

/// One decoded CAN frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanFrame {
    /// Identifier with the flag bits removed
    pub id: u32,
    pub extended: bool,
    pub remote: bool,
    pub error: bool,
    pub dlc: u8,
    pub data: [u8; 8],
}

impl CanFrame {
    /// Build a standard data frame, mostly for tests and simulators
    pub fn new(id: u32, payload: &[u8]) -> Self {
        let len = payload.len().min(8);
        let mut data = [0u8; 8];
        data[..len].copy_from_slice(&payload[..len]);
        Self {
            id: id & CAN_SFF_MASK,
            extended: false,
            remote: false,
            error: false,
            dlc: len as u8,
            data,
        }
    }

    /// Decode a `can_frame` buffer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CanError> {
        if bytes.len() < CAN_FRAME_SIZE {
            return Err(CanError::Truncated(bytes.len()));
        }
        let raw_id = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let dlc = bytes[4];
        if dlc > 8 {
            return Err(CanError::BadLength(dlc));
        }
        let extended = raw_id & CAN_EFF_FLAG != 0;
        let mut data = [0u8; 8];
        data.copy_from_slice(&bytes[8..16]);

        Ok(Self {
            id: if extended {
                raw_id & CAN_EFF_MASK
            } else {
                raw_id & CAN_SFF_MASK
            },
            extended,
            remote: raw_id & CAN_RTR_FLAG != 0,
            error: raw_id & CAN_ERR_FLAG != 0,
            dlc,
            data,
        })
    }

    /// Encode back into the `can_frame` layout
    pub fn to_bytes(&self) -> [u8; CAN_FRAME_SIZE] {
        let mut raw_id = self.id;
        if self.extended {
            raw_id |= CAN_EFF_FLAG;
        }
        if self.remote {
            raw_id |= CAN_RTR_FLAG;
        }
        if self.error {
            raw_id |= CAN_ERR_FLAG;
        }
        let mut out = [0u8; CAN_FRAME_SIZE];
        out[..4].copy_from_slice(&raw_id.to_le_bytes());
        out[4] = self.dlc;
        out[8..].copy_from_slice(&self.data);
        out
    }

    /// Payload bytes; a hand-built `dlc` above 8 is clamped
    pub fn payload(&self) -> &[u8] {
        &self.data[..usize::from(self.dlc).min(8)]
    }

    /// First two payload bytes as a signed little-endian value, 0 when the
    /// payload is shorter
    pub fn value(&self) -> i16 {
        if self.dlc < 2 {
            return 0;
        }
        i16::from_le_bytes([self.data[0], self.data[1]])
    }

    /// Input event for this frame; remote and error frames carry none
    pub fn as_input(&self) -> Option<RawInput> {
        if self.remote || self.error {
            return None;
        }
        Some(RawInput::Can {
            id: self.id as i32,
            value: self.value() as i32,
        })
    }
}

/// State of one CAN-bus controller
#[derive(Debug, Clone, Default)]
pub struct CanBusState {
    interface: String,
    frames: u64,
    dropped: u64,
}

impl CanBusState {
    pub fn new(interface: &str) -> Self {
        Self {
            interface: interface.to_string(),
            ..Default::default()
        }
    }

    /// Network interface the controller is attached to, e.g. `can0`
    pub fn interface(&self) -> &str {
        &self.interface
    }

    /// Decode a raw frame into an input event, counting frames that carry
    /// no input
    pub fn decode(&mut self, bytes: &[u8]) -> Option<RawInput> {
        self.frames += 1;
        let input = match CanFrame::from_bytes(bytes) {
            Ok(frame) => frame.as_input(),
            Err(e) => {
                log::debug!("{}: {}", self.interface, e);
                None
            }
        };
        if input.is_none() {
            self.dropped += 1;
        }
        input
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
