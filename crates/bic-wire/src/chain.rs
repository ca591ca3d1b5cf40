use std::fmt;
use std::io::{self, Read};

use bytes::{Bytes, BytesMut};

use crate::error::WireError;

/// A singly linked chain of byte fragments.
///
/// Each node owns a [`Bytes`] storage handle and a window
/// `[offset, offset + length)` into it, plus an exclusively owned link to
/// the next node. A `ByteChain` value is both a fragment and the head of
/// the chain that starts at it.
///
/// ```text
///   ┌────────────────────┐   ┌────────────────────┐   ┌────────────────────┐
///   │ storage[off..+len] │──▶│ storage[off..+len] │──▶│ storage[off..+len] │──▶ None
///   └────────────────────┘   └────────────────────┘   └────────────────────┘
/// ```
///
/// Storage is immutable and reference counted, so cloning a chain or
/// flattening a single fragment never copies bytes. Operations that
/// reshape the chain ([`recut`](Self::recut)) allocate fresh storage that
/// the new chain owns alone.
pub struct ByteChain {
    storage: Bytes,
    offset: usize,
    length: usize,
    next: Option<Box<ByteChain>>,
}

impl ByteChain {
    /// A single zero-filled fragment whose window covers all `capacity` bytes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::from_bytes(vec![0u8; capacity])
    }

    /// A single fragment over all of `bytes`.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let storage = bytes.into();
        let length = storage.len();
        Self {
            storage,
            offset: 0,
            length,
            next: None,
        }
    }

    /// A single fragment over `storage[offset..offset + length]`.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::FragmentOutOfBounds`] if the window does not
    /// fit inside `storage`.
    pub fn from_parts(
        storage: impl Into<Bytes>,
        offset: usize,
        length: usize,
    ) -> Result<Self, WireError> {
        let storage = storage.into();
        let fits = offset
            .checked_add(length)
            .is_some_and(|end| end <= storage.len());
        if !fits {
            return Err(WireError::FragmentOutOfBounds {
                offset,
                length,
                capacity: storage.len(),
            });
        }
        Ok(Self {
            storage,
            offset,
            length,
            next: None,
        })
    }

    /// Build a chain with one fragment per item, in order.
    ///
    /// An empty iterator yields a single empty fragment.
    pub fn from_fragments<I, B>(fragments: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self::link(fragments.into_iter().map(Self::from_bytes))
    }

    /// Split `data` into a chain of `chunk`-sized fragments.
    ///
    /// # Panics
    ///
    /// Panics if `chunk` is zero.
    #[must_use]
    pub fn from_chunks(data: &[u8], chunk: usize) -> Self {
        assert!(chunk > 0, "chunk size must be non-zero");
        Self::from_fragments(data.chunks(chunk).map(Bytes::copy_from_slice))
    }

    /// A single fragment holding the UTF-8 bytes of `text`.
    ///
    /// The `String`'s allocation becomes the fragment storage.
    pub fn from_string_utf8(text: impl Into<String>) -> Self {
        Self::from_bytes(text.into())
    }

    /// Link nodes front to back. Empty input gives one empty fragment.
    fn link(nodes: impl Iterator<Item = ByteChain>) -> Self {
        let mut nodes: Vec<ByteChain> = nodes.collect();
        let Some(mut head) = nodes.pop() else {
            return Self::from_bytes(Bytes::new());
        };
        while let Some(mut prev) = nodes.pop() {
            prev.next = Some(Box::new(head));
            head = prev;
        }
        head
    }

    /// The valid bytes of this fragment only.
    #[must_use]
    pub fn window(&self) -> &[u8] {
        &self.storage[self.offset..self.offset + self.length]
    }

    /// The whole storage this fragment's window points into.
    #[must_use]
    pub fn storage(&self) -> &Bytes {
        &self.storage
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of this fragment's window (not of the chain).
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[must_use]
    pub fn next(&self) -> Option<&ByteChain> {
        self.next.as_deref()
    }

    pub fn next_mut(&mut self) -> Option<&mut ByteChain> {
        self.next.as_deref_mut()
    }

    /// Replace the link after this fragment, returning the old one.
    pub fn set_next(&mut self, next: Option<ByteChain>) -> Option<ByteChain> {
        let previous = self.next.take();
        self.next = next.map(Box::new);
        previous.map(|node| *node)
    }

    /// Builder form of [`set_next`](Self::set_next).
    #[must_use]
    pub fn with_next(mut self, next: ByteChain) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    /// Iterate over the fragments of the chain starting at `self`.
    #[must_use]
    pub fn fragments(&self) -> Fragments<'_> {
        Fragments { node: Some(self) }
    }

    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.fragments().count()
    }

    /// Window lengths of every fragment, in order.
    #[must_use]
    pub fn fragment_lengths(&self) -> Vec<usize> {
        self.fragments().map(ByteChain::len).collect()
    }

    /// Total number of bytes across all fragments.
    #[must_use]
    pub fn bytecount(&self) -> usize {
        self.fragments().map(ByteChain::len).sum()
    }

    /// One contiguous view of every byte in the chain.
    ///
    /// A single-fragment chain returns a shared view of the existing
    /// storage with no allocation and no copy. Longer chains are copied
    /// once into a buffer sized to [`bytecount`](Self::bytecount).
    #[must_use]
    pub fn flatten(&self) -> Bytes {
        if self.next.is_none() {
            return self.storage.slice(self.offset..self.offset + self.length);
        }
        let mut flat = BytesMut::with_capacity(self.bytecount());
        for fragment in self.fragments() {
            flat.extend_from_slice(fragment.window());
        }
        flat.freeze()
    }

    /// Copy every byte in the chain into a new owned array.
    #[must_use]
    pub fn to_byte_array(&self) -> Vec<u8> {
        let mut array = Vec::with_capacity(self.bytecount());
        for fragment in self.fragments() {
            array.extend_from_slice(fragment.window());
        }
        array
    }

    /// Rebuild the chain with fragments of exactly `fragment_length` bytes.
    ///
    /// Only the last fragment may be shorter. Byte order and total are
    /// preserved, original boundaries are not. The new chain owns freshly
    /// allocated storage. A chain holding no bytes recuts to one empty
    /// fragment.
    ///
    /// ```text
    ///   source  [a a a][b b b b b][c c]        lengths 3, 5, 2
    ///   recut 4 [a a a b][b b b b][c c]        lengths 4, 4, 2
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `fragment_length` is zero.
    #[must_use]
    pub fn recut(&self, fragment_length: usize) -> Self {
        assert!(fragment_length > 0, "fragment length must be non-zero");

        let mut cut = Vec::with_capacity(self.bytecount().div_ceil(fragment_length));
        let mut current = BytesMut::with_capacity(fragment_length);

        for fragment in self.fragments() {
            let mut source = fragment.window();
            while !source.is_empty() {
                // Copy the shorter of the two remaining runs
                let n = source.len().min(fragment_length - current.len());
                current.extend_from_slice(&source[..n]);
                source = &source[n..];

                if current.len() == fragment_length {
                    let full =
                        std::mem::replace(&mut current, BytesMut::with_capacity(fragment_length));
                    cut.push(full.freeze());
                }
            }
        }
        if !current.is_empty() {
            cut.push(current.freeze());
        }

        Self::from_fragments(cut)
    }

    /// The last fragment of the chain.
    #[must_use]
    pub fn tail(&self) -> &ByteChain {
        let mut node = self;
        while let Some(next) = node.next.as_deref() {
            node = next;
        }
        node
    }

    pub fn tail_mut(&mut self) -> &mut ByteChain {
        let mut node = self;
        while node.next.is_some() {
            node = match node.next.as_deref_mut() {
                Some(next) => next,
                None => unreachable!("checked by loop condition"),
            };
        }
        node
    }

    /// Link `chain` after the last fragment and return the new tail.
    ///
    /// Only the old tail's link changes. No bytes are copied.
    pub fn append(&mut self, chain: ByteChain) -> &mut ByteChain {
        let tail = self.tail_mut();
        tail.next = Some(Box::new(chain));
        tail.tail_mut()
    }

    /// Decode this fragment's window (not the rest of the chain) as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidUtf8`] if the window is not valid UTF-8.
    pub fn to_string_utf8(&self) -> Result<&str, WireError> {
        Ok(std::str::from_utf8(self.window())?)
    }

    /// Decode the concatenated bytes of every fragment as UTF-8.
    ///
    /// Characters split across fragment boundaries decode correctly since
    /// the bytes are joined before decoding.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::InvalidUtf8`] if the joined bytes are not valid UTF-8.
    pub fn unroll_to_string_utf8(&self) -> Result<String, WireError> {
        Ok(String::from_utf8(self.to_byte_array())?)
    }

    /// A [`Read`] over the chain that yields at most one fragment per call.
    #[must_use]
    pub fn reader(&self) -> ChainReader<'_> {
        ChainReader {
            fragment: Some(self),
            pos: 0,
        }
    }
}

impl Clone for ByteChain {
    /// Clones share storage with the original; only the nodes are new.
    fn clone(&self) -> Self {
        Self::link(self.fragments().map(|fragment| Self {
            storage: fragment.storage.clone(),
            offset: fragment.offset,
            length: fragment.length,
            next: None,
        }))
    }
}

// Unlink iteratively so a long chain cannot overflow the stack.
impl Drop for ByteChain {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut node) = next {
            next = node.next.take();
        }
    }
}

impl fmt::Debug for ByteChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteChain")
            .field("fragments", &self.fragment_lengths())
            .field("bytecount", &self.bytecount())
            .finish()
    }
}

impl From<Bytes> for ByteChain {
    fn from(bytes: Bytes) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Vec<u8>> for ByteChain {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl<'a> IntoIterator for &'a ByteChain {
    type Item = &'a ByteChain;
    type IntoIter = Fragments<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments()
    }
}

/// Iterator over the fragments of a [`ByteChain`].
pub struct Fragments<'a> {
    node: Option<&'a ByteChain>,
}

impl<'a> Iterator for Fragments<'a> {
    type Item = &'a ByteChain;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.node?;
        self.node = node.next.as_deref();
        Some(node)
    }
}

/// Sequential [`Read`] over a borrowed [`ByteChain`].
///
/// Every call returns bytes from one fragment at most, so a multi-fragment
/// chain behaves like a source that delivers data in chunks.
pub struct ChainReader<'a> {
    fragment: Option<&'a ByteChain>,
    pos: usize,
}

impl Read for ChainReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while let Some(fragment) = self.fragment {
            let window = &fragment.window()[self.pos..];
            if window.is_empty() {
                self.fragment = fragment.next();
                self.pos = 0;
                continue;
            }
            let n = window.len().min(buf.len());
            buf[..n].copy_from_slice(&window[..n]);
            self.pos += n;
            return Ok(n);
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: a chain whose fragments have the given lengths, filled with
    /// a running byte counter so order is checkable.
    fn chain_of(lengths: &[usize]) -> ByteChain {
        let mut next = 0u8;
        ByteChain::from_fragments(lengths.iter().map(|&len| {
            (0..len)
                .map(|_| {
                    next = next.wrapping_add(1);
                    next
                })
                .collect::<Vec<u8>>()
        }))
    }

    #[test]
    fn from_parts_checks_bounds() {
        assert!(ByteChain::from_parts(vec![0u8; 8], 2, 6).is_ok());
        assert!(matches!(
            ByteChain::from_parts(vec![0u8; 8], 3, 6),
            Err(WireError::FragmentOutOfBounds {
                offset: 3,
                length: 6,
                capacity: 8
            })
        ));
        assert!(ByteChain::from_parts(vec![0u8; 8], usize::MAX, 2).is_err());
    }

    #[test]
    fn window_respects_offset() {
        let chain = ByteChain::from_parts(b"abcdefgh".to_vec(), 2, 3).unwrap();
        assert_eq!(chain.window(), b"cde");
        assert_eq!(chain.offset(), 2);
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn flatten_single_fragment_is_zero_copy() {
        let chain = ByteChain::from_parts(b"hello world".to_vec(), 6, 5).unwrap();
        let flat = chain.flatten();
        assert_eq!(&flat[..], b"world");
        assert_eq!(flat.as_ptr(), chain.window().as_ptr());
    }

    #[test]
    fn flatten_multiple_fragments_concatenates() {
        let parts: [&'static [u8]; 4] = [b"ab", b"", b"cde", b"f"];
        let chain = ByteChain::from_fragments(parts);
        let flat = chain.flatten();
        assert_eq!(&flat[..], b"abcdef");
        assert_eq!(chain.to_byte_array(), b"abcdef");
    }

    #[test]
    fn recut_three_five_two_by_four() {
        let chain = chain_of(&[3, 5, 2]);
        let recut = chain.recut(4);
        assert_eq!(recut.fragment_lengths(), vec![4, 4, 2]);
        assert_eq!(recut.bytecount(), 10);
        assert_eq!(recut.to_byte_array(), chain.to_byte_array());
    }

    #[test]
    fn recut_exact_multiple_has_no_empty_tail() {
        let recut = chain_of(&[3, 5]).recut(4);
        assert_eq!(recut.fragment_lengths(), vec![4, 4]);
    }

    #[test]
    fn recut_larger_than_everything() {
        let chain = chain_of(&[1, 2, 3]);
        let recut = chain.recut(100);
        assert_eq!(recut.fragment_lengths(), vec![6]);
        assert_eq!(recut.to_byte_array(), chain.to_byte_array());
    }

    #[test]
    fn recut_smaller_than_smallest() {
        let chain = chain_of(&[2, 7, 3]);
        let recut = chain.recut(1);
        assert_eq!(recut.fragment_lengths(), vec![1; 12]);
        assert_eq!(recut.to_byte_array(), chain.to_byte_array());
    }

    #[test]
    fn recut_skips_empty_fragments() {
        let chain = chain_of(&[0, 3, 0, 0, 2, 0]);
        let recut = chain.recut(2);
        assert_eq!(recut.fragment_lengths(), vec![2, 2, 1]);
        assert_eq!(recut.to_byte_array(), chain.to_byte_array());
    }

    #[test]
    fn recut_empty_chain() {
        let recut = chain_of(&[0, 0]).recut(3);
        assert_eq!(recut.fragment_lengths(), vec![0]);
    }

    #[test]
    #[should_panic(expected = "fragment length must be non-zero")]
    fn recut_zero_panics() {
        let _ = chain_of(&[1]).recut(0);
    }

    #[test]
    fn recut_leaves_source_untouched() {
        let chain = chain_of(&[3, 5, 2]);
        let _ = chain.recut(4);
        assert_eq!(chain.fragment_lengths(), vec![3, 5, 2]);
    }

    #[test]
    fn append_returns_appended_tail() {
        let mut a = chain_of(&[2, 2]);
        let parts: [&'static [u8]; 2] = [b"xy", b"z"];
        let b = ByteChain::from_fragments(parts);
        let b_tail = b.tail().window().as_ptr();
        let b_count = b.bytecount();
        let a_count = a.bytecount();

        let tail = a.append(b);
        assert_eq!(tail.window().as_ptr(), b_tail);
        assert_eq!(tail.window(), b"z");
        assert_eq!(a.bytecount(), a_count + b_count);
        assert_eq!(a.fragment_lengths(), vec![2, 2, 2, 1]);
    }

    #[test]
    fn tail_of_single_fragment_is_itself() {
        let chain = ByteChain::from_bytes(&b"solo"[..]);
        assert!(std::ptr::eq(chain.tail(), &chain));
    }

    #[test]
    fn set_next_returns_previous_link() {
        let mut chain = ByteChain::from_bytes(&b"a"[..]).with_next(ByteChain::from_bytes(&b"b"[..]));
        let old = chain.set_next(Some(ByteChain::from_bytes(&b"cd"[..]))).unwrap();
        assert_eq!(old.window(), b"b");
        assert_eq!(chain.to_byte_array(), b"acd");
    }

    #[test]
    fn utf8_single_fragment() {
        let chain = ByteChain::from_string_utf8("héllo");
        assert_eq!(chain.to_string_utf8().unwrap(), "héllo");
    }

    #[test]
    fn utf8_unroll_across_split_character() {
        // "é" is 0xC3 0xA9; split it across two fragments
        let chain = ByteChain::from_fragments([vec![b'h', 0xC3], vec![0xA9, b'!']]);
        assert!(chain.to_string_utf8().is_err());
        assert_eq!(chain.unroll_to_string_utf8().unwrap(), "hé!");
    }

    #[test]
    fn utf8_invalid_reports_position() {
        let chain = ByteChain::from_bytes(vec![b'o', b'k', 0xFF]);
        assert!(matches!(
            chain.to_string_utf8(),
            Err(WireError::InvalidUtf8 { valid_up_to: 2 })
        ));
    }

    #[test]
    fn clone_shares_storage() {
        let chain = chain_of(&[3, 4]);
        let copy = chain.clone();
        assert_eq!(copy.fragment_lengths(), vec![3, 4]);
        assert_eq!(
            copy.next().unwrap().window().as_ptr(),
            chain.next().unwrap().window().as_ptr()
        );
    }

    #[test]
    fn reader_yields_one_fragment_per_read() {
        let parts: [&'static [u8]; 3] = [b"abc", b"", b"de"];
        let chain = ByteChain::from_fragments(parts);
        let mut reader = chain.reader();
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"abc");
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"de");
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn reader_reads_all_bytes() {
        let chain = chain_of(&[5, 1, 9]);
        let mut out = Vec::new();
        chain.reader().read_to_end(&mut out).unwrap();
        assert_eq!(out, chain.to_byte_array());
    }

    #[test]
    fn from_chunks_splits_evenly() {
        let chain = ByteChain::from_chunks(&[7u8; 10], 4);
        assert_eq!(chain.fragment_lengths(), vec![4, 4, 2]);
    }

    #[test]
    fn long_chain_drops_without_overflow() {
        let chain = ByteChain::from_chunks(&vec![1u8; 200_000], 1);
        assert_eq!(chain.fragment_count(), 200_000);
        drop(chain);
    }

    #[test]
    fn debug_lists_fragment_lengths() {
        let chain = chain_of(&[3, 5, 2]);
        assert_eq!(
            format!("{chain:?}"),
            "ByteChain { fragments: [3, 5, 2], bytecount: 10 }"
        );
    }
}
