//! Decoded, in-memory pages of column elements.

use nestcol_common::{Result, error::Error};

/// An immutable byte buffer whose start is aligned to 8 bytes.
///
/// The alignment allows the content to be reinterpreted in place as a slice of any
/// fixed-width primitive up to 8 bytes wide.
#[derive(Clone)]
pub struct PageBuffer {
    words: Vec<u64>,
    len: usize,
}

impl PageBuffer {
    pub fn from_bytes(bytes: &[u8]) -> PageBuffer {
        let mut words = vec![0u64; bytes.len().div_ceil(8)];
        bytemuck::cast_slice_mut::<u64, u8>(&mut words)[..bytes.len()].copy_from_slice(bytes);
        PageBuffer {
            words,
            len: bytes.len(),
        }
    }

    pub fn from_values<T: bytemuck::NoUninit>(values: &[T]) -> PageBuffer {
        Self::from_bytes(bytemuck::cast_slice(values))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.words)[..self.len]
    }

    /// Reinterprets the buffer as a slice of `T`.
    ///
    /// # Errors
    ///
    /// Fails if the buffer length is not a multiple of `size_of::<T>()`.
    pub fn typed<T: bytemuck::AnyBitPattern>(&self) -> Result<&[T]> {
        bytemuck::try_cast_slice(self.as_bytes())
            .map_err(|e| Error::invalid_arg("page buffer", format!("cast failed: {e}")))
    }
}

impl std::fmt::Debug for PageBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageBuffer")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// A contiguous run of column elements within one cluster.
#[derive(Debug, Clone)]
pub struct Page {
    /// Cluster-local index of the first element in the page.
    first_index: u64,
    element_count: u64,
    element_size: usize,
    buffer: PageBuffer,
}

impl Page {
    pub fn new(first_index: u64, element_size: usize, buffer: PageBuffer) -> Page {
        debug_assert!(element_size > 0);
        debug_assert_eq!(buffer.len() % element_size, 0);
        Page {
            first_index,
            element_count: (buffer.len() / element_size) as u64,
            element_size,
            buffer,
        }
    }

    pub fn first_index(&self) -> u64 {
        self.first_index
    }

    pub fn element_count(&self) -> u64 {
        self.element_count
    }

    /// Cluster-local index one past the last element of the page.
    pub fn end_index(&self) -> u64 {
        self.first_index + self.element_count
    }

    pub fn contains(&self, index: u64) -> bool {
        (self.first_index..self.end_index()).contains(&index)
    }

    pub fn element_size(&self) -> usize {
        self.element_size
    }

    pub fn buffer(&self) -> &PageBuffer {
        &self.buffer
    }

    /// Returns the page elements as a typed slice.
    pub fn values<T: bytemuck::AnyBitPattern>(&self) -> Result<&[T]> {
        if std::mem::size_of::<T>() != self.element_size {
            return Err(Error::invalid_arg(
                "T",
                format!(
                    "element size {} does not match page element size {}",
                    std::mem::size_of::<T>(),
                    self.element_size
                ),
            ));
        }
        self.buffer.typed()
    }
}
