//! Generic signature scanning
//!
//! Only formal type parameter bounds are extracted (`<T:La/Bound;>`); the
//! rest of the signature is skipped structurally.

use crate::errors::{DepGraphError, Result};

/// Classes used as bounds of the formal type parameters of a class or
/// method signature
pub fn generic_bound_classes(signature: &str) -> Result<Vec<String>> {
    let mut scanner = Scanner::new(signature);
    let mut bounds = Vec::new();
    if scanner.peek() != Some(b'<') {
        return Ok(bounds);
    }
    scanner.bump();
    while scanner.peek() != Some(b'>') {
        scanner.identifier_until(b':')?;
        // class bound (may be empty), then interface bounds
        while scanner.peek() == Some(b':') {
            scanner.bump();
            if matches!(scanner.peek(), Some(b'L' | b'T' | b'[')) {
                if let Some(class) = scanner.field_type()? {
                    bounds.push(class);
                }
            }
        }
        if scanner.at_end() {
            return Err(scanner.malformed());
        }
    }
    Ok(bounds)
}

struct Scanner<'s> {
    text: &'s str,
    pos: usize,
}

impl<'s> Scanner<'s> {
    fn new(text: &'s str) -> Self {
        Self { text, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn malformed(&self) -> DepGraphError {
        DepGraphError::malformed(format!("{} (at offset {})", self.text, self.pos))
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.peek() == Some(byte) {
            self.bump();
            Ok(())
        } else {
            Err(self.malformed())
        }
    }

    /// Identifier up to (not including) `end`
    fn identifier_until(&mut self, end: u8) -> Result<&'s str> {
        let start = self.pos;
        let len = self.text.as_bytes()[start..]
            .iter()
            .position(|&b| b == end)
            .ok_or_else(|| self.malformed())?;
        self.pos += len;
        if len == 0 {
            return Err(self.malformed());
        }
        Ok(&self.text[start..start + len])
    }

    /// Identifier up to the first delimiter of a class type signature
    fn class_segment(&mut self) -> Result<&'s str> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'<' | b'.' | b';') {
                break;
            }
            self.bump();
        }
        if self.pos == start || self.at_end() {
            return Err(self.malformed());
        }
        Ok(&self.text[start..self.pos])
    }

    /// Skips one field type signature; returns the binary name when it is a
    /// class type
    fn field_type(&mut self) -> Result<Option<String>> {
        match self.peek() {
            Some(b'L') => {
                self.bump();
                let mut name = self.class_segment()?.to_string();
                loop {
                    match self.peek() {
                        Some(b'<') => self.type_arguments()?,
                        Some(b'.') => {
                            self.bump();
                            name.push('$');
                            name.push_str(self.class_segment()?);
                        }
                        Some(b';') => {
                            self.bump();
                            return Ok(Some(name));
                        }
                        _ => return Err(self.malformed()),
                    }
                }
            }
            Some(b'T') => {
                self.bump();
                self.identifier_until(b';')?;
                self.bump();
                Ok(None)
            }
            Some(b'[') => {
                self.bump();
                self.type_signature()?;
                Ok(None)
            }
            _ => Err(self.malformed()),
        }
    }

    fn type_signature(&mut self) -> Result<()> {
        match self.peek() {
            Some(b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z') => {
                self.bump();
                Ok(())
            }
            _ => self.field_type().map(|_| ()),
        }
    }

    fn type_arguments(&mut self) -> Result<()> {
        self.expect(b'<')?;
        loop {
            match self.peek() {
                Some(b'>') => {
                    self.bump();
                    return Ok(());
                }
                Some(b'*') => self.bump(),
                Some(b'+' | b'-') => {
                    self.bump();
                    self.field_type()?;
                }
                Some(_) => {
                    self.field_type()?;
                }
                None => return Err(self.malformed()),
            }
        }
    }
}
