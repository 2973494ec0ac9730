use crate::language::types::ValueType;
use std::collections::HashMap;

/// A named definition; the address (first storage slot) is only set inside
/// the code generator's table.
#[derive(Clone, Debug)]
pub struct Symbol {
    name: String,
    ty: ValueType,
    address: Option<usize>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: ValueType) -> Self {
        Self {
            name: name.into(),
            ty,
            address: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> ValueType {
        self.ty
    }

    pub fn set_ty(&mut self, ty: ValueType) {
        self.ty = ty;
    }

    pub fn address(&self) -> Option<usize> {
        self.address
    }

    pub fn set_address(&mut self, address: usize) {
        self.address = Some(address);
    }
}

/// Scoped name environment with shadowing: every name maps to a stack of
/// definitions, every open scope records the names entered during it.
/// Each pass constructs its own table.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Vec<Symbol>>,
    scopes: Vec<Vec<String>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_scope(&mut self) {
        self.scopes.push(Vec::new());
    }

    /// Closing without an open scope is a traversal bug, not a user error.
    pub fn close_scope(&mut self) {
        let frame = self
            .scopes
            .pop()
            .expect("close_scope called with no open scope");
        for name in frame {
            if let Some(stack) = self.symbols.get_mut(&name) {
                stack.pop();
            }
        }
    }

    pub fn enter(&mut self, name: impl Into<String>, symbol: Symbol) {
        let name = name.into();
        self.scopes
            .last_mut()
            .expect("enter called with no open scope")
            .push(name.clone());
        self.symbols.entry(name).or_default().push(symbol);
    }

    pub fn retrieve(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name).and_then(|stack| stack.last())
    }

    pub fn retrieve_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.symbols.get_mut(name).and_then(|stack| stack.last_mut())
    }

    pub fn current_level(&self) -> usize {
        self.scopes.len()
    }
}
