use core::fmt;

use avaproof_codec::{Decode, DecodeError, Encode};
use bytes::{Buf, BufMut};

use crate::TxId;

/// Reference to a transaction output: `txid:vout`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutPoint {
    /// The transaction that created the output
    pub txid: TxId,
    /// Index of the output within that transaction
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: TxId, vout: u32) -> Self {
        Self { txid, vout }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

impl Encode for OutPoint {
    fn encode<B: BufMut>(&self, buf: &mut B) {
        self.txid.encode(buf);
        buf.put_u32_le(self.vout);
    }
}

impl Decode for OutPoint {
    fn decode<B: Buf>(buf: &mut B) -> Result<Self, DecodeError> {
        let txid = TxId::decode(buf)?;
        let vout = buf.try_get_u32_le()?;
        Ok(Self { txid, vout })
    }
}
