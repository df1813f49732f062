use bytes::{Buf, BufMut};

use crate::{DecodeError, MAX_COMPACT_SIZE};

/// Checked reads on top of [`Buf`].
///
/// Fixed-width integers use the native `Buf::try_get_*` readers, whose
/// [`bytes::TryGetError`] converts into [`DecodeError::UnexpectedEof`].
pub trait BufExt: Buf {
    fn ensure(&self, needed: usize) -> Result<(), DecodeError> {
        if self.remaining() < needed {
            return Err(DecodeError::UnexpectedEof {
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    fn try_get_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        self.ensure(N)?;
        let mut out = [0; N];
        self.copy_to_slice(&mut out);
        Ok(out)
    }

    /// Read a compact-size integer, rejecting non-canonical encodings
    /// and values above [`MAX_COMPACT_SIZE`].
    fn try_get_compact_size(&mut self) -> Result<u64, DecodeError> {
        let n = match self.try_get_u8()? {
            0xfd => {
                let n = u64::from(self.try_get_u16_le()?);
                if n < 0xfd {
                    return Err(DecodeError::NonCanonicalCompactSize);
                }
                n
            }
            0xfe => {
                let n = u64::from(self.try_get_u32_le()?);
                if n <= 0xffff {
                    return Err(DecodeError::NonCanonicalCompactSize);
                }
                n
            }
            0xff => {
                let n = self.try_get_u64_le()?;
                if n <= 0xffff_ffff {
                    return Err(DecodeError::NonCanonicalCompactSize);
                }
                n
            }
            n => u64::from(n),
        };

        if n > MAX_COMPACT_SIZE {
            return Err(DecodeError::SizeTooLarge {
                size: n,
                max: MAX_COMPACT_SIZE,
            });
        }

        Ok(n)
    }

    /// Read a compact-size prefixed byte string of at most `max` bytes.
    fn try_get_var_bytes(&mut self, max: usize) -> Result<Vec<u8>, DecodeError> {
        let len = self.try_get_compact_size()?;
        if len > max as u64 {
            return Err(DecodeError::SizeTooLarge {
                size: len,
                max: max as u64,
            });
        }

        let len = len as usize;
        self.ensure(len)?;
        let mut out = vec![0; len];
        self.copy_to_slice(&mut out);
        Ok(out)
    }
}

impl<B: Buf + ?Sized> BufExt for B {}

pub trait BufMutExt: BufMut {
    fn put_compact_size(&mut self, n: u64) {
        match n {
            0..=0xfc => self.put_u8(n as u8),
            0xfd..=0xffff => {
                self.put_u8(0xfd);
                self.put_u16_le(n as u16);
            }
            0x1_0000..=0xffff_ffff => {
                self.put_u8(0xfe);
                self.put_u32_le(n as u32);
            }
            _ => {
                self.put_u8(0xff);
                self.put_u64_le(n);
            }
        }
    }

    fn put_var_bytes(&mut self, bytes: &[u8]) {
        self.put_compact_size(bytes.len() as u64);
        self.put_slice(bytes);
    }
}

impl<B: BufMut + ?Sized> BufMutExt for B {}
