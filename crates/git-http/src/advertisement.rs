//! Parsing and byte-exact re-encoding of the `info/refs` advertisement stream.

use std::fmt;

use crate::pktline::{encode_pkt_line, next_pkt_line, PktLine, PktLineError, PKT_FLUSH};

#[derive(Debug)]
pub struct AdvertisementError(pub String);

impl fmt::Display for AdvertisementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed advertisement: {}", self.0)
    }
}

impl std::error::Error for AdvertisementError {}

impl From<PktLineError> for AdvertisementError {
    fn from(e: PktLineError) -> Self {
        match e {
            PktLineError::NeedMore => AdvertisementError("truncated pkt-line stream".into()),
            PktLineError::Malformed => AdvertisementError("malformed pkt-line frame".into()),
        }
    }
}

/// A single ref, as advertised (not including the synthetic `HEAD` first line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefRecord {
    pub name: String,
    pub hash: String,
    pub peeled_hash: Option<String>,
}

impl RefRecord {
    /// The commit a consumer actually fetches: the peeled commit for an
    /// annotated tag, else the ref's own hash.
    pub fn best_hash(&self) -> &str {
        self.peeled_hash.as_deref().unwrap_or(&self.hash)
    }
}

/// A parsed `info/refs?service=git-upload-pack` advertisement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefAdvertisement {
    pub service: String,
    pub main_name: String,
    pub main_id: String,
    pub capabilities: Vec<String>,
    pub records: Vec<RefRecord>,
}

impl RefAdvertisement {
    /// Parses the full `info/refs` byte stream. Never mutates `data`; records
    /// borrow nothing from it (owned `String`s), so the advertisement outlives
    /// the input buffer.
    pub fn parse(data: &[u8]) -> Result<Self, AdvertisementError> {
        let mut cursor = data;

        let (service_line, n) = next_pkt_line(cursor)?;
        cursor = &cursor[n..];
        let service_line = match service_line {
            PktLine::Data(d) => d,
            PktLine::Flush => return Err(AdvertisementError("expected service line, got flush".into())),
        };
        let service_line = std::str::from_utf8(service_line)
            .map_err(|_| AdvertisementError("service line is not utf-8".into()))?;
        let service = service_line
            .strip_prefix("# service=")
            .and_then(|s| s.strip_suffix('\n'))
            .ok_or_else(|| AdvertisementError(format!("unexpected service line {service_line:?}")))?
            .to_string();

        let (flush, n) = next_pkt_line(cursor)?;
        cursor = &cursor[n..];
        if flush != PktLine::Flush {
            return Err(AdvertisementError("expected flush after service line".into()));
        }

        let (head_line, n) = next_pkt_line(cursor)?;
        cursor = &cursor[n..];
        let head_line = match head_line {
            PktLine::Data(d) => d,
            PktLine::Flush => return Err(AdvertisementError("expected HEAD ref line, got flush".into())),
        };
        let nul = head_line
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| AdvertisementError("first ref line has no capability separator".into()))?;
        let (hash_and_name, rest) = (&head_line[..nul], &head_line[nul + 1..]);
        let hash_and_name = std::str::from_utf8(hash_and_name)
            .map_err(|_| AdvertisementError("HEAD ref line is not utf-8".into()))?;
        let (main_id, main_name) = split_hash_and_name(hash_and_name)?;
        let caps_str = std::str::from_utf8(rest)
            .map_err(|_| AdvertisementError("capability list is not utf-8".into()))?
            .trim_end_matches('\n');
        let capabilities: Vec<String> =
            if caps_str.is_empty() { Vec::new() } else { caps_str.split(' ').map(str::to_string).collect() };

        let mut records: Vec<RefRecord> = Vec::new();
        loop {
            let (line, n) = next_pkt_line(cursor)?;
            cursor = &cursor[n..];
            let data = match line {
                PktLine::Flush => break,
                PktLine::Data(d) => d,
            };
            let line_str = std::str::from_utf8(data)
                .map_err(|_| AdvertisementError("ref line is not utf-8".into()))?
                .trim_end_matches('\n');
            let (hash, name) = split_hash_and_name(line_str)?;

            if let Some(tag_name) = name.strip_suffix("^{}") {
                let last = records
                    .last_mut()
                    .ok_or_else(|| AdvertisementError("peeled line with no preceding record".into()))?;
                if last.name != tag_name {
                    return Err(AdvertisementError(format!(
                        "peeled line {name:?} does not follow its tag {:?}",
                        last.name
                    )));
                }
                last.peeled_hash = Some(hash);
            } else {
                records.push(RefRecord { name: name.to_string(), hash, peeled_hash: None });
            }
        }

        Ok(RefAdvertisement { service, main_name, main_id, capabilities, records })
    }

    /// Re-encodes the advertisement to its wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(encode_pkt_line(format!("# service={}\n", self.service).as_bytes()));
        out.extend_from_slice(PKT_FLUSH);

        let caps = self.capabilities.join(" ");
        out.extend(encode_pkt_line(
            format!("{} {}\0{}\n", self.main_id, self.main_name, caps).as_bytes(),
        ));

        for record in &self.records {
            out.extend(encode_pkt_line(format!("{} {}\n", record.hash, record.name).as_bytes()));
            if let Some(peeled) = &record.peeled_hash {
                out.extend(encode_pkt_line(format!("{} {}^{{}}\n", peeled, record.name).as_bytes()));
            }
        }
        out.extend_from_slice(PKT_FLUSH);
        out
    }
}

fn split_hash_and_name(s: &str) -> Result<(String, String), AdvertisementError> {
    let mut parts = s.splitn(2, ' ');
    let hash = parts.next().filter(|s| !s.is_empty());
    let name = parts.next().filter(|s| !s.is_empty());
    match (hash, name) {
        (Some(h), Some(n)) => Ok((h.to_string(), n.to_string())),
        _ => Err(AdvertisementError(format!("malformed ref line {s:?}"))),
    }
}
