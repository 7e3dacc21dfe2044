// SPDX-FileCopyrightText: 2024 - 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Sparse Intcode memory, split into fixed-size pages kept in a hashmap

use itertools::Itertools;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use std::fmt::{self, Display};
use std::num::ParseIntError;
use std::ops::{Index, IndexMut, Range};
use std::path::Path;
use std::str::FromStr;
use std::{fs, io};

const PAGE_SIZE: usize = 512;
const PAGE_MASK: u64 = PAGE_SIZE as u64 - 1;

macro_rules! page_index {
    ($i: expr) => {{
        #[allow(clippy::cast_possible_truncation, reason = "masked down anyway")]
        {
            ($i & PAGE_MASK) as usize
        }
    }};
}

macro_rules! page_base {
    ($i: expr) => {
        $i & !PAGE_MASK
    };
}

static EMPTY: [i64; PAGE_SIZE] = [0; PAGE_SIZE];

/// Intcode memory: a mapping from non-negative addresses to `i64` cells.
///
/// Memory behaves like an infinite zero-filled tape. Pages are only allocated once something writes
/// to them, so programs that scatter values far past the end of their code stay cheap.
///
/// Cloning a [Ram] produces a fully independent copy, so one loaded program can be reused across
/// any number of runs.
///
/// ```
/// use intcode_vm::Ram;
/// let mut ram: Ram = "1,0,0,3,99".parse().unwrap();
/// let pristine = ram.clone();
/// ram.write(1 << 40, 7);
/// assert_eq!(ram.read(1 << 40), 7);
/// assert_eq!(pristine.read(1 << 40), 0);
/// ```
#[derive(Default)]
pub struct Ram {
    pages: HashMap<u64, Box<[i64; PAGE_SIZE]>>,
    extent: u64,
}

impl Ram {
    /// Build memory holding `values`, starting at address 0
    pub fn new(values: impl IntoIterator<Item = i64>) -> Self {
        values.into_iter().collect()
    }

    /// Read the program text in the file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(text.parse()?)
    }

    /// Get the value at `addr`. Addresses that were never written hold `0`.
    #[doc(alias = "peek")]
    pub fn read(&self, addr: u64) -> i64 {
        self[addr]
    }

    /// Store `val` at `addr`
    #[doc(alias = "poke")]
    pub fn write(&mut self, addr: u64, val: i64) {
        self[addr] = val;
    }

    /// One past the highest address that was loaded or written
    pub fn extent(&self) -> u64 {
        self.extent
    }

    /// Whether nothing was ever loaded or written
    pub fn is_empty(&self) -> bool {
        self.extent == 0
    }

    fn page(&self, base: u64) -> &[i64; PAGE_SIZE] {
        self.pages.get(&base).map_or(&EMPTY, |p| p.as_ref())
    }

    fn active_pages(&self) -> BTreeSet<u64> {
        self.pages
            .iter()
            .filter_map(|(&k, v)| (v.as_ref() != &EMPTY).then_some(k))
            .collect()
    }

    /// Remove all pages that are filled with zeroes, and shrink the page table's allocation
    pub fn prune(&mut self) {
        self.pages.retain(|_, p| p[..] != EMPTY);
        self.pages.shrink_to_fit();
    }

    /// Get the values in `range`, only copying if the range crosses a page boundary
    pub fn get_range(&self, range: Range<u64>) -> Cow<'_, [i64]> {
        if range.is_empty() {
            return Cow::Borrowed(&[]);
        }
        let first = range.start;
        let last = range.end - 1;
        let first_page = page_base!(first);
        let last_page = page_base!(last);
        if first_page == last_page {
            Cow::Borrowed(&self.page(first_page)[page_index!(first)..=page_index!(last)])
        } else {
            let mut v = Vec::new();
            v.extend_from_slice(&self.page(first_page)[page_index!(first)..]);
            for page in ((first_page + PAGE_SIZE as u64)..last_page).step_by(PAGE_SIZE) {
                v.extend_from_slice(self.page(page));
            }
            v.extend_from_slice(&self.page(last_page)[..=page_index!(last)]);
            Cow::Owned(v)
        }
    }
}

impl Index<u64> for Ram {
    type Output = i64;
    fn index(&self, i: u64) -> &i64 {
        &self.page(page_base!(i))[page_index!(i)]
    }
}

impl IndexMut<u64> for Ram {
    fn index_mut(&mut self, i: u64) -> &mut i64 {
        self.extent = self.extent.max(i.saturating_add(1));
        &mut self
            .pages
            .entry(page_base!(i))
            .or_insert_with(|| Box::new([0; PAGE_SIZE]))[page_index!(i)]
    }
}

impl Clone for Ram {
    fn clone(&self) -> Self {
        // don't copy blank pages
        let pages = self
            .pages
            .iter()
            .filter(|&(_, page)| page.as_ref() != &EMPTY)
            .map(|(&base, page)| (base, page.clone()))
            .collect();
        Self {
            pages,
            extent: self.extent,
        }
    }
}

// blank pages and the extent are bookkeeping, only the contents matter
impl PartialEq for Ram {
    fn eq(&self, other: &Self) -> bool {
        let active_pages = self.active_pages();
        other.active_pages() == active_pages
            && active_pages
                .into_iter()
                .all(|base| self.pages[&base] == other.pages[&base])
    }
}

impl Eq for Ram {}

impl FromIterator<i64> for Ram {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut pages = HashMap::with_capacity(iter.size_hint().0.div_ceil(PAGE_SIZE));
        let mut extent = 0;
        let mut base = 0;

        for chunk in &iter.chunks(PAGE_SIZE) {
            let page = chunk
                .inspect(|_| extent += 1)
                .pad_using(PAGE_SIZE, |_| 0)
                .collect_array::<PAGE_SIZE>()
                .expect("padded to a full page");
            pages.insert(base, Box::new(page));
            base += PAGE_SIZE as u64;
        }

        Self { pages, extent }
    }
}

/// Iterator over the values in a [Ram], from address 0 up to its [extent](Ram::extent)
pub struct RamIter {
    ram: Ram,
    next: u64,
}

impl Iterator for RamIter {
    type Item = i64;
    fn next(&mut self) -> Option<i64> {
        if self.next >= self.ram.extent {
            return None;
        }
        let val = self.ram[self.next];
        self.next += 1;
        Some(val)
    }
}

impl IntoIterator for Ram {
    type Item = i64;
    type IntoIter = RamIter;
    fn into_iter(mut self) -> RamIter {
        self.prune();
        RamIter { ram: self, next: 0 }
    }
}

impl FromStr for Ram {
    type Err = ParseRamError;

    /// Parse comma-separated program text. Surrounding whitespace is ignored, and blank text
    /// produces empty memory.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::default());
        }
        text.split(',')
            .map(str::trim)
            .enumerate()
            .map(|(index, token)| {
                token.parse::<i64>().map_err(|source| ParseRamError {
                    index,
                    token: token.into(),
                    source,
                })
            })
            .collect()
    }
}

impl fmt::Debug for Ram {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fmtmap = fmt.debug_map();
        for base in self.pages.keys().sorted_unstable() {
            if self.pages[base].as_ref() != &EMPTY {
                fmtmap.entry(
                    &format_args!("{{ page 0x{base:04x} }}"),
                    &format_args!("{:?}", self.pages[base]),
                );
            }
        }
        fmtmap.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A token in program text was not a valid `i64`
pub struct ParseRamError {
    /// The address the token would have been loaded into
    pub index: usize,
    /// The offending token
    pub token: Box<str>,
    /// Why it failed to parse
    pub source: ParseIntError,
}

impl Display for ParseRamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to parse {:?} at position {}: {}",
            self.token, self.index, self.source
        )
    }
}

impl Error for ParseRamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

#[derive(Debug)]
/// Failure to load memory from a file
pub enum LoadError {
    /// The file could not be read
    Io {
        /// The path as given
        path: String,
        /// The underlying error
        source: io::Error,
    },
    /// The file's contents were not valid program text
    Parse(ParseRamError),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => write!(f, "failed to read {path}: {source}"),
            LoadError::Parse(e) => Display::fmt(e, f),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Parse(e) => Some(e),
        }
    }
}

impl From<ParseRamError> for LoadError {
    fn from(e: ParseRamError) -> Self {
        Self::Parse(e)
    }
}
