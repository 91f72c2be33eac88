use crate::Cell;

/// Data stack of cells with a limit on the number of elements.
#[derive(Debug, Clone)]
pub struct Stack {
    cells: Vec<Cell>,
    max_elements: usize,
}

impl Stack {
    pub fn with_max_elements(max_elements: usize) -> Self {
        assert!(max_elements > 0);
        Self {
            cells: Vec::new(),
            max_elements,
        }
    }
    pub fn max_elements(&self) -> usize {
        self.max_elements
    }
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
    pub fn clear(&mut self) {
        self.cells.clear()
    }
    #[must_use]
    pub fn push(&mut self, val: Cell) -> Option<()> {
        if self.len() < self.max_elements {
            self.cells.push(val);
            Some(())
        } else {
            None
        }
    }
    #[must_use]
    pub fn pop(&mut self) -> Option<Cell> {
        self.cells.pop()
    }
    pub fn last_mut(&mut self) -> Option<&mut Cell> {
        self.cells.last_mut()
    }
    /// Element `n` places below the top, `peek(0)` is the top.
    pub fn peek(&self, n: usize) -> Option<Cell> {
        let len = self.len();
        if n < len {
            Some(self.cells[len - 1 - n])
        } else {
            None
        }
    }
    /// Remove the element `n` places below the top.
    pub fn remove(&mut self, n: usize) -> Option<Cell> {
        let len = self.len();
        if n < len {
            Some(self.cells.remove(len - 1 - n))
        } else {
            None
        }
    }
    pub fn as_slice(&self) -> &[Cell] {
        &self.cells
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.cells.iter()
    }
}

impl<'a> IntoIterator for &'a Stack {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[test]
fn test_stack_limit() {
    let mut stack = Stack::with_max_elements(3);
    for i in 0..3 {
        assert!(stack.push(i).is_some());
    }
    assert!(stack.push(3).is_none());
    assert_eq!(stack.as_slice(), &[0, 1, 2]);
    assert_eq!(stack.pop(), Some(2));
    assert!(stack.push(3).is_some());
    assert_eq!(stack.len(), 3);
}

#[test]
fn test_stack_peek_remove() {
    let mut stack = Stack::with_max_elements(8);
    for i in 10..14 {
        stack.push(i).unwrap();
    }
    assert_eq!(stack.peek(0), Some(13));
    assert_eq!(stack.peek(3), Some(10));
    assert_eq!(stack.peek(4), None);
    assert_eq!(stack.remove(2), Some(11));
    assert_eq!(stack.as_slice(), &[10, 12, 13]);
    assert_eq!(stack.remove(3), None);
    stack.clear();
    assert!(stack.is_empty());
    assert_eq!(stack.pop(), None);
}
