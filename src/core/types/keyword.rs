/// Reserved word recognised by the lexer.
///
/// Keywords are ordinary well-known string atoms that additionally carry a
/// token, so classifying an identifier costs one atom lookup.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Keyword {
  Async,
  Await,
  Break,
  Case,
  Catch,
  Class,
  Const,
  Continue,
  Debugger,
  Default,
  Delete,
  Do,
  Else,
  Export,
  Extends,
  False,
  Finally,
  For,
  Function,
  If,
  Import,
  In,
  Instanceof,
  Let,
  New,
  Null,
  Of,
  Return,
  Static,
  Super,
  Switch,
  This,
  Throw,
  True,
  Try,
  Typeof,
  Var,
  Void,
  While,
  With,
  Yield,
}

impl Keyword {
  /// Returns `true` if the keyword may still be used as an identifier in
  /// some contexts.
  #[inline]
  pub const fn is_contextual(self) -> bool {
    matches!(self, Self::Async | Self::Await | Self::Let | Self::Of | Self::Static | Self::Yield)
  }

  /// Returns `true` if the keyword denotes a literal value.
  #[inline]
  pub const fn is_literal(self) -> bool {
    matches!(self, Self::False | Self::Null | Self::True)
  }
}
