//! Git pkt-line encode/decode.
//!
//! A frame is a 4-hex-digit big-endian ASCII length prefix followed by
//! `length-4` payload bytes; `0000` is the flush marker.

/// One decoded pkt-line frame, borrowing from the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PktLine<'a> {
    Flush,
    Data(&'a [u8]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PktLineError {
    /// The buffer does not yet contain a full frame; the caller should read more.
    NeedMore,
    /// The length prefix is not valid hex, or is in the illegal `0x0001..0x0003` range.
    Malformed,
}

pub const PKT_FLUSH: &[u8] = b"0000";

/// Reads one frame from the head of `buf`, returning the frame and the number
/// of bytes consumed. The returned payload aliases `buf`; callers must copy
/// if they need to retain it beyond `buf`'s lifetime.
pub fn next_pkt_line(buf: &[u8]) -> Result<(PktLine<'_>, usize), PktLineError> {
    if buf.len() < 4 {
        return Err(PktLineError::NeedMore);
    }
    let len_hex = std::str::from_utf8(&buf[..4]).map_err(|_| PktLineError::Malformed)?;
    let len = usize::from_str_radix(len_hex, 16).map_err(|_| PktLineError::Malformed)?;

    if len == 0 {
        return Ok((PktLine::Flush, 4));
    }
    if len < 4 {
        return Err(PktLineError::Malformed);
    }
    if buf.len() < len {
        return Err(PktLineError::NeedMore);
    }
    Ok((PktLine::Data(&buf[4..len]), len))
}

/// Encodes a single non-flush frame. Use [`PKT_FLUSH`] directly to encode a flush.
pub fn encode_pkt_line(payload: &[u8]) -> Vec<u8> {
    let len = 4 + payload.len();
    let mut out = Vec::with_capacity(len);
    out.extend_from_slice(format!("{len:04x}").as_bytes());
    out.extend_from_slice(payload);
    out
}
