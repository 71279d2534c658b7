//! Names the grammar compares identifiers against.
//!
//! The table is built once per parser from that parser's interner, so every
//! comparison is an `Atom` equality. There is no process-wide registry.

use crate::interner::{Atom, Interner};

#[derive(Clone, Copy, Debug)]
pub struct KnownNames {
    pub eval: Atom,
    pub arguments: Atom,
    pub callee: Atom,
    pub caller: Atom,
    pub constructor: Atom,
    pub prototype: Atom,
    pub proto: Atom,
    pub get: Atom,
    pub set: Atom,
    pub of: Atom,
    pub let_: Atom,
    pub static_: Atom,
    pub yield_: Atom,
}

impl KnownNames {
    pub fn new(interner: &mut Interner) -> Self {
        KnownNames {
            eval: interner.intern("eval"),
            arguments: interner.intern("arguments"),
            callee: interner.intern("callee"),
            caller: interner.intern("caller"),
            constructor: interner.intern("constructor"),
            prototype: interner.intern("prototype"),
            proto: interner.intern("__proto__"),
            get: interner.intern("get"),
            set: interner.intern("set"),
            of: interner.intern("of"),
            let_: interner.intern("let"),
            static_: interner.intern("static"),
            yield_: interner.intern("yield"),
        }
    }

    /// `eval` and `arguments` may not be bound or assigned in strict code.
    #[inline]
    pub fn is_eval_or_arguments(&self, name: Atom) -> bool {
        name == self.eval || name == self.arguments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names_share_interner_atoms() {
        let mut interner = Interner::new();
        let names = KnownNames::new(&mut interner);
        assert_eq!(interner.intern("eval"), names.eval);
        assert!(names.is_eval_or_arguments(interner.intern("arguments")));
        assert!(!names.is_eval_or_arguments(interner.intern("argument")));
    }
}
