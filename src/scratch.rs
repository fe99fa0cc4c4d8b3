/// Fixed-width byte slots used to move strings through the table protocol.
///
/// The slots live exactly as long as this value, so every exit path of a read or write
/// releases them.
#[derive(Debug)]
pub(crate) struct StringSlots {
    slots: Vec<Box<[u8]>>,
}

impl StringSlots {
    pub(crate) fn zeroed(count: usize, width: usize) -> Self {
        StringSlots {
            slots: (0..count)
                .map(|_| vec![0u8; width].into_boxed_slice())
                .collect(),
        }
    }

    /// Copies each string into a NUL-padded slot of `width` bytes, cutting longer ones.
    pub(crate) fn encode<'a>(values: impl IntoIterator<Item = &'a str>, width: usize) -> Self {
        StringSlots {
            slots: values
                .into_iter()
                .map(|value| {
                    let mut slot = vec![0u8; width].into_boxed_slice();
                    let n = value.len().min(width);
                    slot[..n].copy_from_slice(&value.as_bytes()[..n]);
                    slot
                })
                .collect(),
        }
    }

    pub(crate) fn as_slots(&self) -> &[Box<[u8]>] {
        &self.slots
    }

    pub(crate) fn as_mut_slots(&mut self) -> &mut [Box<[u8]>] {
        &mut self.slots
    }

    /// Contents of slot `i` up to the first NUL, without trailing padding.
    pub(crate) fn decode(&self, i: usize) -> String {
        let slot = &self.slots[i];
        let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
        String::from_utf8_lossy(&slot[..end]).trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_pads_and_cuts() {
        let slots = StringSlots::encode(["ab", "toolong"], 4);
        assert_eq!(&*slots.as_slots()[0], b"ab\0\0");
        assert_eq!(&*slots.as_slots()[1], b"tool");
        assert_eq!(slots.decode(0), "ab");
        assert_eq!(slots.decode(1), "tool");
    }

    #[test]
    fn decode_trims_blank_padding() {
        let mut slots = StringSlots::zeroed(1, 6);
        slots.as_mut_slots()[0].copy_from_slice(b"x y   ");
        assert_eq!(slots.decode(0), "x y");
    }
}
