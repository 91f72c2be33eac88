use crate::error::ForthError;
use crate::Cell;

/// Address of the cell holding the numeric base.
pub const BASE_ADDR: usize = 0;
pub const DEFAULT_BASE: Cell = 10;

/// Return true if `val` is within [lower, upper).
fn is_within<T: Ord>(val: &T, lower: &T, upper: &T) -> bool {
    assert!(lower <= upper);
    lower <= val && val < upper
}

/// Cell addressed memory with stack based allocation scheme.
///
/// Cell 0 is the base register, allocations start right after it and
/// `current` is the bump pointer (`HERE`).
#[derive(Debug)]
pub struct Memory {
    cells: Vec<Cell>,
    current: usize,
}

impl Memory {
    pub fn with_size(cells: usize) -> Self {
        assert!(cells > BASE_ADDR + 1);
        let mut cells = vec![0; cells];
        cells[BASE_ADDR] = DEFAULT_BASE;
        Memory {
            cells,
            current: BASE_ADDR + 1,
        }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn here(&self) -> usize {
        self.current
    }

    pub fn unused(&self) -> usize {
        self.size() - self.current
    }

    pub fn is_valid_addr(&self, addr: Cell) -> bool {
        addr >= 0 && is_within(&(addr as usize), &0, &self.size())
    }

    /// Check that the `len` cells starting at `addr` are all addressable.
    pub fn check_range(&self, addr: Cell, len: usize) -> Result<usize, ForthError> {
        if !self.is_valid_addr(addr) {
            return Err(ForthError::InvalidAddress(addr));
        }
        let start = addr as usize;
        match start.checked_add(len) {
            Some(end) if end <= self.size() => Ok(start),
            _ => Err(ForthError::InvalidAddress(addr.saturating_add(len as Cell))),
        }
    }

    pub fn fetch(&self, addr: Cell) -> Result<Cell, ForthError> {
        let ix = self.check_range(addr, 1)?;
        Ok(self.cells[ix])
    }

    pub fn store(&mut self, addr: Cell, val: Cell) -> Result<(), ForthError> {
        let ix = self.check_range(addr, 1)?;
        self.cells[ix] = val;
        Ok(())
    }

    pub fn slice(&self, addr: Cell, len: usize) -> Result<&[Cell], ForthError> {
        let start = self.check_range(addr, len)?;
        Ok(&self.cells[start..start + len])
    }

    pub fn slice_mut(&mut self, addr: Cell, len: usize) -> Result<&mut [Cell], ForthError> {
        let start = self.check_range(addr, len)?;
        Ok(&mut self.cells[start..start + len])
    }

    /// Copy `len` cells from `src` to `dst`, the ranges may overlap.
    pub fn copy(&mut self, src: Cell, dst: Cell, len: usize) -> Result<(), ForthError> {
        let src = self.check_range(src, len)?;
        let dst = self.check_range(dst, len)?;
        self.cells.copy_within(src..src + len, dst);
        Ok(())
    }

    /// Number of cells from `addr` up to (not including) the first zero cell,
    /// or up to the end of memory.
    pub fn zero_terminated_len(&self, addr: Cell) -> Result<usize, ForthError> {
        let start = self.check_range(addr, 0)?;
        let len = self.cells[start..]
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(self.size() - start);
        Ok(len)
    }

    /// Bump allocate `cells`, returning the address of the first one.
    pub fn alloc(&mut self, cells: usize) -> Option<usize> {
        if cells > self.unused() {
            None
        } else {
            let ret = self.current;
            self.current += cells;
            Some(ret)
        }
    }

    #[must_use]
    pub fn dealloc(&mut self, cells: usize) -> bool {
        if cells > self.current - (BASE_ADDR + 1) {
            false
        } else {
            self.current -= cells;
            true
        }
    }

    /// Copy `src` into freshly allocated cells followed by a zero cell.
    pub fn alloc_str(&mut self, src: &str) -> Option<(usize, usize)> {
        let len = src.chars().count();
        let addr = self.alloc(len + 1)?;
        for (cell, ch) in self.cells[addr..addr + len].iter_mut().zip(src.chars()) {
            *cell = ch as Cell;
        }
        self.cells[addr + len] = 0;
        Some((addr, len))
    }

    pub fn base(&self) -> Cell {
        self.cells[BASE_ADDR]
    }

    pub fn set_base(&mut self, base: Cell) {
        self.cells[BASE_ADDR] = base;
    }
}

#[test]
fn test_memory_alloc() {
    let mut memory = Memory::with_size(16);
    assert_eq!(memory.here(), 1);
    assert_eq!(memory.unused(), 15);
    assert_eq!(memory.alloc(4), Some(1));
    assert_eq!(memory.here(), 5);
    assert_eq!(memory.alloc(11), Some(5));
    assert_eq!(memory.unused(), 0);
    assert_eq!(memory.alloc(1), None);
    assert!(memory.dealloc(15));
    assert_eq!(memory.here(), 1);
    // The base register is never released.
    assert!(!memory.dealloc(1));
}

#[test]
fn test_memory_bounds() {
    let mut memory = Memory::with_size(8);
    assert_eq!(memory.base(), DEFAULT_BASE);
    assert!(memory.store(7, 42).is_ok());
    assert_eq!(memory.fetch(7), Ok(42));
    assert_eq!(memory.store(8, 1), Err(ForthError::InvalidAddress(8)));
    assert_eq!(memory.store(-1, 1), Err(ForthError::InvalidAddress(-1)));
    assert_eq!(memory.fetch(8), Err(ForthError::InvalidAddress(8)));
    assert!(memory.slice(6, 2).is_ok());
    assert!(memory.slice(6, 3).is_err());
    assert!(memory.slice(8, 0).is_err());
}

#[test]
fn test_memory_strings() {
    let mut memory = Memory::with_size(32);
    let (addr, len) = memory.alloc_str("Hi!").unwrap();
    assert_eq!((addr, len), (1, 3));
    assert_eq!(memory.here(), 5);
    assert_eq!(memory.slice(1, 4).unwrap(), &['H' as Cell, 'i' as Cell, '!' as Cell, 0]);
    assert_eq!(memory.zero_terminated_len(1), Ok(3));
    assert_eq!(memory.zero_terminated_len(4), Ok(0));
    let mut tiny = Memory::with_size(3);
    assert_eq!(tiny.alloc_str("abc"), None);
}

#[test]
fn test_memory_copy_overlapping() {
    let mut memory = Memory::with_size(8);
    for addr in 1..5 {
        memory.store(addr, addr * 10).unwrap();
    }
    memory.copy(1, 2, 3).unwrap();
    assert_eq!(memory.slice(1, 4).unwrap(), &[10, 10, 20, 30]);
    assert_eq!(memory.copy(1, 6, 3), Err(ForthError::InvalidAddress(9)));
    assert_eq!(memory.slice(6, 2).unwrap(), &[0, 0]);
}
