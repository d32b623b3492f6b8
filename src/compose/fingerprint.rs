use std::fmt;

use crate::encode::wled::WledPayload;

/// Stable 128-bit digest of a payload, used to detect unchanged output between compositions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct PayloadFingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl fmt::Display for PayloadFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

pub fn fingerprint_payload(payload: &WledPayload) -> PayloadFingerprint {
    let mut h = PairHasher::new();

    h.write_u8(u8::from(payload.on));
    h.write_u8(payload.bri);
    h.write_u64(u64::from(payload.transition));
    h.write_u64(payload.seg.len() as u64);
    for seg in &payload.seg {
        h.write_u64(u64::from(seg.id));
        h.write_u64(seg.start as u64);
        h.write_u64(seg.stop as u64);

        match &seg.i {
            Some(values) => {
                h.write_u8(1);
                h.write_u64(values.len() as u64);
                for &v in values {
                    h.write_u64(u64::from(v));
                }
            }
            None => h.write_u8(0),
        }
        match &seg.col {
            Some(colors) => {
                h.write_u8(1);
                h.write_u64(colors.len() as u64);
                for c in colors {
                    h.write_bytes(c);
                }
            }
            None => h.write_u8(0),
        }
        for v in [seg.fx, seg.sx, seg.ix] {
            match v {
                Some(v) => {
                    h.write_u8(1);
                    h.write_u8(v);
                }
                None => h.write_u8(0),
            }
        }
        match seg.rev {
            Some(rev) => {
                h.write_u8(1);
                h.write_u8(u8::from(rev));
            }
            None => h.write_u8(0),
        }
    }

    h.finish()
}

/// Two FNV-1a lanes with different offsets, fed identical bytes.
struct PairHasher {
    a: Fnv1a64,
    b: Fnv1a64,
}

impl PairHasher {
    fn new() -> Self {
        Self {
            a: Fnv1a64::new(0xcbf29ce484222325),
            b: Fnv1a64::new(0x9ae16a3b2f90404f),
        }
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.a.write_bytes(bytes);
        self.b.write_bytes(bytes);
    }

    fn finish(self) -> PayloadFingerprint {
        PayloadFingerprint {
            hi: self.a.0,
            lo: self.b.0,
        }
    }
}

#[derive(Clone, Copy)]
struct Fnv1a64(u64);

impl Fnv1a64 {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        self.0 = h;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/fingerprint.rs"]
mod tests;
