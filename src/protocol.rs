//! Export protocol shared between the device and host tooling
//!
//! Three fixed 20-byte frame types carried over the Data-Transfer
//! notification, a one-byte-opcode command format on the Control
//! characteristic, and a 4-byte snapshot on the Status characteristic.
//!
//! All multi-byte fields are big-endian. Counts that can exceed the
//! protocol ceiling saturate at 65535.

use heapless::Vec;

use crate::domain::SensorRecord;
use crate::error::Error;

/// Fixed frame size (transport payload ceiling).
pub const FRAME_LEN: usize = 20;

/// Records carried by one Data frame.
pub const RECORDS_PER_FRAME: usize = 2;

/// Status snapshot size.
pub const STATUS_LEN: usize = 4;

pub const FRAME_TYPE_HEADER: u8 = 0;
pub const FRAME_TYPE_DATA: u8 = 1;
pub const FRAME_TYPE_END: u8 = 2;

pub const CMD_START_TRANSFER: u8 = 0x01;
pub const CMD_STOP_TRANSFER: u8 = 0x02;
/// Reserved opcode, accepted and ignored.
pub const CMD_RESERVED: u8 = 0x03;
pub const CMD_SET_LAST_SENT: u8 = 0x04;

/// Clamp a store-side count to the u16 protocol ceiling
#[inline]
pub fn saturate(value: u32) -> u16 {
    if value > u16::MAX as u32 {
        u16::MAX
    } else {
        value as u16
    }
}

#[inline]
fn put_u16_be(buf: &mut [u8], value: u16) {
    buf[0] = (value >> 8) as u8;
    buf[1] = (value & 0xFF) as u8;
}

#[inline]
fn get_u16_be(buf: &[u8]) -> u16 {
    ((buf[0] as u16) << 8) | buf[1] as u16
}

// ============================================================================
// Frames (Data-Transfer characteristic, device -> host)
// ============================================================================

/// One fixed-size protocol frame
///
/// Wire layout (all frames padded with zeros to 20 bytes):
///
/// | frame  | byte 0 | fields                                        |
/// |--------|--------|-----------------------------------------------|
/// | Header | 0      | interval:u16, total:u16, last_sent:u16        |
/// | Data   | 1      | seq:u16, count:u8, 0, up to 2 x 6-byte record |
/// | End    | 2      | total_sent:u16                                |
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// Opens a session: sampling interval, session total, acknowledged cursor
    Header {
        interval_sec: u16,
        total: u16,
        last_sent: u16,
    },
    /// Up to two sequential records starting at `seq`
    Data {
        seq: u16,
        records: Vec<SensorRecord, RECORDS_PER_FRAME>,
    },
    /// Closes a session with the number of records actually sent
    End { total_sent: u16 },
}

impl Frame {
    /// Build a Header frame, saturating the counters
    pub fn header(interval_sec: u16, total: u32, last_sent: u32) -> Self {
        Frame::Header {
            interval_sec,
            total: saturate(total),
            last_sent: saturate(last_sent),
        }
    }

    /// Build a Data frame from at most [`RECORDS_PER_FRAME`] records
    pub fn data(seq: u32, records: &[SensorRecord]) -> Self {
        let mut out = Vec::new();
        for record in records.iter().take(RECORDS_PER_FRAME) {
            let _ = out.push(*record);
        }
        Frame::Data {
            seq: saturate(seq),
            records: out,
        }
    }

    /// Build an End frame, saturating the counter
    pub fn end(total_sent: u32) -> Self {
        Frame::End {
            total_sent: saturate(total_sent),
        }
    }

    /// Serialize to the fixed 20-byte layout
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut buf = [0u8; FRAME_LEN];
        match self {
            Frame::Header {
                interval_sec,
                total,
                last_sent,
            } => {
                buf[0] = FRAME_TYPE_HEADER;
                put_u16_be(&mut buf[1..3], *interval_sec);
                put_u16_be(&mut buf[3..5], *total);
                put_u16_be(&mut buf[5..7], *last_sent);
            }
            Frame::Data { seq, records } => {
                buf[0] = FRAME_TYPE_DATA;
                put_u16_be(&mut buf[1..3], *seq);
                buf[3] = records.len() as u8;
                // buf[4] stays zero (count high byte)
                for (i, record) in records.iter().enumerate() {
                    let off = 5 + i * SensorRecord::WIRE_SIZE;
                    buf[off..off + SensorRecord::WIRE_SIZE].copy_from_slice(&record.to_bytes());
                }
            }
            Frame::End { total_sent } => {
                buf[0] = FRAME_TYPE_END;
                put_u16_be(&mut buf[1..3], *total_sent);
            }
        }
        buf
    }

    /// Parse a received frame (host side)
    pub fn decode(raw: &[u8]) -> Result<Frame, Error> {
        if raw.len() < FRAME_LEN {
            return Err(Error::InvalidLength);
        }
        match raw[0] {
            FRAME_TYPE_HEADER => Ok(Frame::Header {
                interval_sec: get_u16_be(&raw[1..3]),
                total: get_u16_be(&raw[3..5]),
                last_sent: get_u16_be(&raw[5..7]),
            }),
            FRAME_TYPE_DATA => {
                let count = raw[3] as usize;
                if count > RECORDS_PER_FRAME {
                    return Err(Error::InvalidLength);
                }
                let mut records = Vec::new();
                for i in 0..count {
                    let off = 5 + i * SensorRecord::WIRE_SIZE;
                    let mut bytes = [0u8; SensorRecord::WIRE_SIZE];
                    bytes.copy_from_slice(&raw[off..off + SensorRecord::WIRE_SIZE]);
                    let _ = records.push(SensorRecord::from_bytes(&bytes));
                }
                Ok(Frame::Data {
                    seq: get_u16_be(&raw[1..3]),
                    records,
                })
            }
            FRAME_TYPE_END => Ok(Frame::End {
                total_sent: get_u16_be(&raw[1..3]),
            }),
            _ => Err(Error::InvalidLength),
        }
    }
}

// ============================================================================
// Commands (Control characteristic, host -> device)
// ============================================================================

/// A parsed control command
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Command {
    /// Begin an export session from `start_index`
    StartTransfer { start_index: u16 },
    /// Abort the active export session
    StopTransfer,
    /// Persist the consumer-acknowledged export cursor
    SetLastSent { index: u16 },
}

impl Command {
    /// Parse an inbound control write
    ///
    /// Returns `Ok(None)` for reserved or unknown opcodes (accepted and
    /// ignored), `InvalidLength` for an empty write or a short payload.
    pub fn parse(data: &[u8]) -> Result<Option<Command>, Error> {
        let (&opcode, payload) = data.split_first().ok_or(Error::InvalidLength)?;
        match opcode {
            CMD_START_TRANSFER => {
                if payload.len() < 2 {
                    return Err(Error::InvalidLength);
                }
                Ok(Some(Command::StartTransfer {
                    start_index: get_u16_be(payload),
                }))
            }
            CMD_STOP_TRANSFER => Ok(Some(Command::StopTransfer)),
            CMD_SET_LAST_SENT => {
                if payload.len() < 2 {
                    return Err(Error::InvalidLength);
                }
                Ok(Some(Command::SetLastSent {
                    index: get_u16_be(payload),
                }))
            }
            _ => Ok(None),
        }
    }

    /// Serialize for sending from host tooling
    pub fn encode(&self) -> Vec<u8, 3> {
        let mut buf = Vec::new();
        match self {
            Command::StartTransfer { start_index } => {
                let _ = buf.push(CMD_START_TRANSFER);
                let _ = buf.push((start_index >> 8) as u8);
                let _ = buf.push((start_index & 0xFF) as u8);
            }
            Command::StopTransfer => {
                let _ = buf.push(CMD_STOP_TRANSFER);
            }
            Command::SetLastSent { index } => {
                let _ = buf.push(CMD_SET_LAST_SENT);
                let _ = buf.push((index >> 8) as u8);
                let _ = buf.push((index & 0xFF) as u8);
            }
        }
        buf
    }
}

// ============================================================================
// Status snapshot (Status characteristic)
// ============================================================================

/// Encode the 4-byte status snapshot: count, last_sent (both saturated)
pub fn encode_status(count: u32, last_sent: u32) -> [u8; STATUS_LEN] {
    let mut buf = [0u8; STATUS_LEN];
    put_u16_be(&mut buf[0..2], saturate(count));
    put_u16_be(&mut buf[2..4], saturate(last_sent));
    buf
}

/// Decode a status snapshot (host side): `(count, last_sent)`
pub fn decode_status(data: &[u8]) -> Result<(u16, u16), Error> {
    if data.len() < STATUS_LEN {
        return Err(Error::InvalidLength);
    }
    Ok((get_u16_be(&data[0..2]), get_u16_be(&data[2..4])))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let frame = Frame::header(10, 300, 150);
        let bytes = frame.encode();
        assert_eq!(bytes[0], FRAME_TYPE_HEADER);
        assert_eq!(&bytes[1..3], &[0x00, 0x0A]);
        assert_eq!(&bytes[3..5], &[0x01, 0x2C]);
        assert_eq!(&bytes[5..7], &[0x00, 0x96]);
        assert!(bytes[7..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_data_layout_two_records() {
        let records = [
            SensorRecord::new(250, 1013, 50, 30),
            SensorRecord::new(-10, 980, 79, 41),
        ];
        let frame = Frame::data(0x0102, &records);
        let bytes = frame.encode();
        assert_eq!(bytes[0], FRAME_TYPE_DATA);
        assert_eq!(&bytes[1..3], &[0x01, 0x02]);
        assert_eq!(bytes[3], 2);
        assert_eq!(bytes[4], 0);
        assert_eq!(&bytes[5..11], &records[0].to_bytes());
        assert_eq!(&bytes[11..17], &records[1].to_bytes());
        assert_eq!(&bytes[17..], &[0, 0, 0]);
    }

    #[test]
    fn test_data_layout_single_record_padded() {
        let records = [SensorRecord::new(200, 1000, 40, 33)];
        let bytes = Frame::data(7, &records).encode();
        assert_eq!(bytes[3], 1);
        assert!(bytes[11..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_end_layout() {
        let bytes = Frame::end(300).encode();
        assert_eq!(bytes[0], FRAME_TYPE_END);
        assert_eq!(&bytes[1..3], &[0x01, 0x2C]);
        assert!(bytes[3..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_counts_saturate_at_ceiling() {
        let bytes = Frame::header(10, 80_000, 70_000).encode();
        assert_eq!(&bytes[3..5], &[0xFF, 0xFF]);
        assert_eq!(&bytes[5..7], &[0xFF, 0xFF]);
        let status = encode_status(80_000, 66_000);
        assert_eq!(status, [0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_frame_decode_roundtrip() {
        let records = [
            SensorRecord::new(221, 999, 31, 39),
            SensorRecord::new(-300, 1019, 60, 42),
        ];
        for frame in [
            Frame::header(10, 12, 4),
            Frame::data(298, &records),
            Frame::end(300),
        ] {
            assert_eq!(Frame::decode(&frame.encode()).unwrap(), frame);
        }
    }

    #[test]
    fn test_decode_rejects_short_or_unknown() {
        assert_eq!(Frame::decode(&[0u8; 10]), Err(Error::InvalidLength));
        let mut bad = [0u8; FRAME_LEN];
        bad[0] = 9;
        assert_eq!(Frame::decode(&bad), Err(Error::InvalidLength));
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(
            Command::parse(&[CMD_START_TRANSFER, 0x01, 0x2C]).unwrap(),
            Some(Command::StartTransfer { start_index: 300 })
        );
        assert_eq!(
            Command::parse(&[CMD_STOP_TRANSFER]).unwrap(),
            Some(Command::StopTransfer)
        );
        assert_eq!(
            Command::parse(&[CMD_SET_LAST_SENT, 0x00, 0x96]).unwrap(),
            Some(Command::SetLastSent { index: 150 })
        );
    }

    #[test]
    fn test_command_parse_rejects_short_payload() {
        assert_eq!(Command::parse(&[]), Err(Error::InvalidLength));
        assert_eq!(
            Command::parse(&[CMD_START_TRANSFER, 0x01]),
            Err(Error::InvalidLength)
        );
        assert_eq!(
            Command::parse(&[CMD_SET_LAST_SENT]),
            Err(Error::InvalidLength)
        );
    }

    #[test]
    fn test_reserved_opcode_ignored() {
        assert_eq!(Command::parse(&[CMD_RESERVED]).unwrap(), None);
        assert_eq!(Command::parse(&[0x7F, 1, 2, 3]).unwrap(), None);
    }

    #[test]
    fn test_command_encode_matches_parse() {
        for cmd in [
            Command::StartTransfer { start_index: 42 },
            Command::StopTransfer,
            Command::SetLastSent { index: 65535 },
        ] {
            assert_eq!(Command::parse(&cmd.encode()).unwrap(), Some(cmd));
        }
    }

    #[test]
    fn test_status_snapshot() {
        let status = encode_status(300, 150);
        assert_eq!(status, [0x01, 0x2C, 0x00, 0x96]);
        assert_eq!(decode_status(&status).unwrap(), (300, 150));
    }
}
