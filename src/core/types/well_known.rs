//! Compiled-in definitions of the well-known atoms.
//!
//! Well-known atoms have fixed ids assigned by their position in the list
//! below: symbols first, then strings. They are inserted into every shared
//! atom table before anything else and live for the whole process.

use crate::core::AtomId;
use crate::core::Keyword;

// -----------------------------------------------------------------------------
// Well-Known Definition
// -----------------------------------------------------------------------------

/// One entry of a well-known atom definition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WellKnown {
  id: AtomId,
  kind: WellKnownKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WellKnownKind {
  Symbol {
    description: &'static str,
  },
  String {
    text: &'static str,
    keyword: Option<Keyword>,
  },
}

impl WellKnown {
  /// Defines a symbol keyed by its fixed id.
  #[inline]
  pub const fn symbol(id: AtomId, description: &'static str) -> Self {
    Self {
      id,
      kind: WellKnownKind::Symbol { description },
    }
  }

  /// Defines a string keyed by its content.
  #[inline]
  pub const fn string(id: AtomId, text: &'static str, keyword: Option<Keyword>) -> Self {
    Self {
      id,
      kind: WellKnownKind::String { text, keyword },
    }
  }

  /// Returns the fixed atom id.
  #[inline]
  pub const fn id(&self) -> AtomId {
    self.id
  }

  /// Returns `true` if this entry defines a symbol.
  #[inline]
  pub const fn is_symbol(&self) -> bool {
    matches!(self.kind, WellKnownKind::Symbol { .. })
  }

  /// Returns the string content, or the description of a symbol.
  #[inline]
  pub const fn text(&self) -> &'static str {
    match self.kind {
      WellKnownKind::Symbol { description } => description,
      WellKnownKind::String { text, .. } => text,
    }
  }

  /// Returns the lexer token of a reserved word.
  #[inline]
  pub const fn keyword(&self) -> Option<Keyword> {
    match self.kind {
      WellKnownKind::Symbol { .. } => None,
      WellKnownKind::String { keyword, .. } => keyword,
    }
  }
}

// -----------------------------------------------------------------------------
// Well-Known Table
// -----------------------------------------------------------------------------

macro_rules! well_known {
  (
    symbols { $($symbol:ident => $description:literal,)* }
    strings { $($string:ident => $text:literal $([$keyword:ident])?,)* }
  ) => {
    #[allow(dead_code, non_camel_case_types, clippy::upper_case_acronyms)]
    #[repr(u32)]
    enum Ordinal {
      $($symbol,)*
      $($string,)*
      COUNT,
    }

    impl AtomId {
      $(
        #[doc = concat!("Well-known symbol `", $description, "`.")]
        pub const $symbol: Self = Self::from_raw(Ordinal::$symbol as u32);
      )*
      $(
        #[doc = concat!("Well-known string `\"", $text, "\"`.")]
        pub const $string: Self = Self::from_raw(Ordinal::$string as u32);
      )*
    }

    /// Number of well-known atoms; the first dynamic id.
    pub const WELL_KNOWN_COUNT: u32 = Ordinal::COUNT as u32;

    /// Definition table of every well-known atom, in id order.
    pub static WELL_KNOWN: &[WellKnown] = &[
      $(WellKnown::symbol(AtomId::$symbol, $description),)*
      $(WellKnown::string(AtomId::$string, $text, well_known!(@keyword $($keyword)?)),)*
    ];
  };
  (@keyword) => {
    None
  };
  (@keyword $keyword:ident) => {
    Some(Keyword::$keyword)
  };
}

well_known! {
  symbols {
    SYMBOL_ASYNC_ITERATOR => "Symbol.asyncIterator",
    SYMBOL_HAS_INSTANCE => "Symbol.hasInstance",
    SYMBOL_IS_CONCAT_SPREADABLE => "Symbol.isConcatSpreadable",
    SYMBOL_ITERATOR => "Symbol.iterator",
    SYMBOL_MATCH => "Symbol.match",
    SYMBOL_MATCH_ALL => "Symbol.matchAll",
    SYMBOL_REPLACE => "Symbol.replace",
    SYMBOL_SEARCH => "Symbol.search",
    SYMBOL_SPECIES => "Symbol.species",
    SYMBOL_SPLIT => "Symbol.split",
    SYMBOL_TO_PRIMITIVE => "Symbol.toPrimitive",
    SYMBOL_TO_STRING_TAG => "Symbol.toStringTag",
    SYMBOL_UNSCOPABLES => "Symbol.unscopables",
  }
  strings {
    EMPTY => "",
    PROTO => "__proto__",
    ARGUMENTS => "arguments",
    ARRAY => "Array",
    BOOLEAN => "Boolean",
    CALLEE => "callee",
    CONFIGURABLE => "configurable",
    CONSTRUCTOR => "constructor",
    DONE => "done",
    ENUMERABLE => "enumerable",
    ERROR => "Error",
    EVAL => "eval",
    FUNCTION => "Function",
    GET => "get",
    GLOBAL_THIS => "globalThis",
    INDEX => "index",
    INFINITY => "Infinity",
    INPUT => "input",
    JOIN => "join",
    JSON => "JSON",
    LENGTH => "length",
    MATH => "Math",
    MESSAGE => "message",
    NAME => "name",
    NAN => "NaN",
    NEGATIVE_INFINITY => "-Infinity",
    NEXT => "next",
    NUMBER => "Number",
    OBJECT => "Object",
    PROTOTYPE => "prototype",
    SET => "set",
    STACK => "stack",
    STRING => "String",
    SYMBOL => "Symbol",
    THEN => "then",
    TO_STRING => "toString",
    UNDEFINED => "undefined",
    VALUE => "value",
    VALUE_OF => "valueOf",
    WRITABLE => "writable",
    KW_ASYNC => "async" [Async],
    KW_AWAIT => "await" [Await],
    KW_BREAK => "break" [Break],
    KW_CASE => "case" [Case],
    KW_CATCH => "catch" [Catch],
    KW_CLASS => "class" [Class],
    KW_CONST => "const" [Const],
    KW_CONTINUE => "continue" [Continue],
    KW_DEBUGGER => "debugger" [Debugger],
    KW_DEFAULT => "default" [Default],
    KW_DELETE => "delete" [Delete],
    KW_DO => "do" [Do],
    KW_ELSE => "else" [Else],
    KW_EXPORT => "export" [Export],
    KW_EXTENDS => "extends" [Extends],
    KW_FALSE => "false" [False],
    KW_FINALLY => "finally" [Finally],
    KW_FOR => "for" [For],
    KW_FUNCTION => "function" [Function],
    KW_IF => "if" [If],
    KW_IMPORT => "import" [Import],
    KW_IN => "in" [In],
    KW_INSTANCEOF => "instanceof" [Instanceof],
    KW_LET => "let" [Let],
    KW_NEW => "new" [New],
    KW_NULL => "null" [Null],
    KW_OF => "of" [Of],
    KW_RETURN => "return" [Return],
    KW_STATIC => "static" [Static],
    KW_SUPER => "super" [Super],
    KW_SWITCH => "switch" [Switch],
    KW_THIS => "this" [This],
    KW_THROW => "throw" [Throw],
    KW_TRUE => "true" [True],
    KW_TRY => "try" [Try],
    KW_TYPEOF => "typeof" [Typeof],
    KW_VAR => "var" [Var],
    KW_VOID => "void" [Void],
    KW_WHILE => "while" [While],
    KW_WITH => "with" [With],
    KW_YIELD => "yield" [Yield],
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
