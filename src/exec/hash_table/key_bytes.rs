// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
use std::ptr::NonNull;

/// Raw (pointer, length) view of byte storage owned elsewhere.
///
/// Contract: the referenced storage is read-only and must stay alive and
/// unmoved until the field holding the view is re-assigned or the key is
/// duplicated. Transient keys point views at batch-owned buffers; the batch
/// layer guarantees those buffers outlive the key's use of them.
#[derive(Clone, Copy, Debug)]
pub struct ByteView {
    ptr: usize,
    len: usize,
}

impl ByteView {
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            ptr: bytes.as_ptr() as usize,
            len: bytes.len(),
        }
    }

    pub fn empty() -> Self {
        Self {
            ptr: NonNull::<u8>::dangling().as_ptr() as usize,
            len: 0,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr as *const u8, self.len) }
    }
}

/// Storage behind one variable-length key field.
///
/// The aliasing contract lives in the type: `Borrowed` views batch-owned
/// memory under the `ByteView` validity rules, `Owned` is an exclusive copy
/// detached from any batch and only ever produced by key duplication.
#[derive(Clone, Debug)]
pub enum KeyBytes {
    Borrowed(ByteView),
    Owned(Box<[u8]>),
}

impl KeyBytes {
    /// Placeholder for never-assigned and null fields; reads as empty.
    pub fn empty() -> Self {
        KeyBytes::Borrowed(ByteView::empty())
    }

    pub fn borrowed(bytes: &[u8]) -> Self {
        KeyBytes::Borrowed(ByteView::new(bytes))
    }

    pub fn owned_copy(bytes: &[u8]) -> Self {
        KeyBytes::Owned(Box::from(bytes))
    }

    pub fn as_slice(&self) -> &[u8] {
        match self {
            KeyBytes::Borrowed(view) => view.as_slice(),
            KeyBytes::Owned(bytes) => bytes,
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, KeyBytes::Owned(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{ByteView, KeyBytes};

    #[test]
    fn test_view_reads_source_without_copying() {
        let backing = vec![1u8, 2, 3, 4];
        let view = ByteView::new(&backing);
        assert_eq!(view.as_slice(), &backing[..]);
        assert_eq!(view.as_slice().as_ptr(), backing.as_ptr());
    }

    #[test]
    fn test_empty_view_is_zero_length() {
        assert_eq!(ByteView::empty().as_slice(), &[] as &[u8]);
        assert_eq!(KeyBytes::empty().as_slice().len(), 0);
        assert!(!KeyBytes::empty().is_owned());
    }

    #[test]
    fn test_owned_copy_detaches_from_source() {
        let mut backing = vec![7u8, 8, 9];
        let owned = KeyBytes::owned_copy(&backing);
        backing[0] = 0;
        assert_eq!(owned.as_slice(), &[7, 8, 9]);
        assert!(owned.is_owned());
    }
}
