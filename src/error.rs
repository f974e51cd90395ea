use core::fmt;

/// The error type returned by every fallible [`crate::RoutingTable`]
/// operation.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    msg: Option<String>,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    pub(crate) fn new<S: Into<String>>(
        kind: ErrorKind,
        msg: Option<S>,
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            kind,
            msg: msg.map(Into::into),
            source,
        }
    }

    /// The kind of error that occurred.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(msg) = &self.msg {
            write!(f, "{}: {}", self.kind, msg)
        } else {
            self.kind.fmt(f)
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// The distinct failure modes a [`RoutingTable`](crate::RoutingTable) can
/// raise. All other "no result" situations return an empty collection
/// rather than an error.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ErrorKind {
    /// The address library rejected the textual input.
    InvalidAddress,
    /// `parent`, `children`, or `delete` were called on a prefix with no
    /// exact-match bucket.
    NoExactMatch,
    /// `delete` or `flush` were called with an attribute filter that
    /// matched no route at the targeted bucket.
    NoAttrMatch,
    /// `show` was called with `as_root = true` and no prefix.
    UsageError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidAddress => write!(f, "invalid address or prefix"),
            Self::NoExactMatch => write!(f, "no exact match for prefix"),
            Self::NoAttrMatch => write!(f, "no route matched the attribute filter"),
            Self::UsageError => write!(f, "as_root requires an explicit prefix"),
        }
    }
}

macro_rules! err {
    ( $kind:expr ) => {
        $crate::error::Error::new::<&'static str>($kind, None, None)
    };
    ( $kind:expr, $msg:expr ) => {
        $crate::error::Error::new($kind, Some($msg), None)
    };
    ( $kind:expr, $msg:expr, $source:expr ) => {
        $crate::error::Error::new(
            $kind,
            Some($msg),
            Some(Box::new($source) as Box<dyn std::error::Error + Send + Sync + 'static>),
        )
    };
}
pub(crate) use err;

/// Convenience alias used throughout the crate's doctests and unit tests.
#[cfg(test)]
pub type TestResult = Result<(), Box<dyn std::error::Error>>;
