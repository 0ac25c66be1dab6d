//! Provide suffix array construction that runs in O(N+|Σ|) time by induced sorting (SA-IS).
//!
//! The implementation follows the algorithm proposed in the paper [*Two Efficient Algorithms for Linear Time Suffix Array Construction*](https://doi.org/10.1109/TC.2010.188).
//!
//! No terminator has to be appended to the input: every sequence is treated as if it were
//! followed by a virtual sentinel that is smaller than any real symbol.
//!
//! # Example
//! ```ignore
//! use std::fs;
//! use std::io;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let buf = fs::read("./english.100MB")?;
//!     let sa = sais::build(&buf[..])?;
//!     assert_eq!(sa.len(), buf.len());
//!
//!     Ok(())
//! }
//! ```
use log::debug;
use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

mod sais;

mod private {
    use num::PrimInt;
    use std::fmt::Debug;

    pub trait Char: PrimInt + Copy + Debug {
        /// Largest symbol the type can hold, if small enough to size bucket tables from it.
        const ALPHABET: Option<usize>;

        fn of_u(v: usize) -> Self;
        fn to_u(&self) -> usize;
    }

    macro_rules! impl_char {
        ($uint:ty, $alphabet:expr) => {
            impl Char for $uint {
                const ALPHABET: Option<usize> = $alphabet;

                #[inline]
                fn of_u(v: usize) -> Self {
                    v as $uint
                }
                #[inline]
                fn to_u(&self) -> usize {
                    *self as usize
                }
            }
        };
    }

    impl_char!(u8, Some(u8::MAX as usize));

    impl_char!(u16, Some(u16::MAX as usize));

    #[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
    impl_char!(u32, None);

    #[cfg(target_pointer_width = "64")]
    impl_char!(u64, None);

    impl_char!(usize, None);
}

/// A trait that represents both symbol and index: primitive unsigned integer type that fit into `usize`.
///
/// This is a [sealed trait](https://rust-lang.github.io/api-guidelines/future-proofing.html).
pub trait Char: private::Char {}

macro_rules! impl_char {
    ($uint:ty) => {
        impl Char for $uint {}
    };
}

impl_char!(u8);

impl_char!(u16);

#[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
impl_char!(u32);

#[cfg(target_pointer_width = "64")]
impl_char!(u64);

impl_char!(usize);

/// Read-only, random access view over the symbols to be suffix sorted.
///
/// Implemented for slices of any [`Char`] (raw bytes, wide integers) and for [`Text`].
pub trait Sequence {
    /// Number of symbols.
    fn len(&self) -> usize;

    /// Returns `true` if the sequence has no symbols.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Symbol at position `i`, widened to `usize`.
    fn symbol(&self, i: usize) -> usize;

    /// Upper bound of the alphabet implied by the backing storage.
    ///
    /// `None` means the bound has to be found by scanning the symbols.
    fn max_symbol_hint(&self) -> Option<usize> {
        None
    }
}

impl<C: Char> Sequence for [C] {
    #[inline]
    fn len(&self) -> usize {
        <[C]>::len(self)
    }

    #[inline]
    fn symbol(&self, i: usize) -> usize {
        self[i].to_u()
    }

    fn max_symbol_hint(&self) -> Option<usize> {
        C::ALPHABET
    }
}

impl<C: Char> Sequence for Vec<C> {
    #[inline]
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    fn symbol(&self, i: usize) -> usize {
        self.as_slice().symbol(i)
    }

    fn max_symbol_hint(&self) -> Option<usize> {
        C::ALPHABET
    }
}

impl<C: Char, const N: usize> Sequence for [C; N] {
    #[inline]
    fn len(&self) -> usize {
        N
    }

    #[inline]
    fn symbol(&self, i: usize) -> usize {
        self[i].to_u()
    }

    fn max_symbol_hint(&self) -> Option<usize> {
        C::ALPHABET
    }
}

/// Text viewed as its UTF-16 code units.
///
/// For ASCII text the symbols equal the bytes, so the suffix array of a `Text` equals the suffix
/// array of the same bytes. ASCII text is borrowed as is; any other text is encoded to UTF-16
/// once, which holds a copy of the code units for the lifetime of the `Text`. Use
/// [`Text::from_units`] to borrow code units that are already encoded.
///
/// # Example
/// ```
/// use sais::Text;
///
/// let text = Text::new("abracadabra");
/// let sa = sais::build(&text).unwrap();
///
/// assert_eq!(sa, vec![10, 7, 0, 3, 5, 8, 1, 4, 6, 9, 2]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Text<'a> {
    repr: Repr<'a>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Repr<'a> {
    Ascii(&'a [u8]),
    Units(Cow<'a, [u16]>),
}

impl<'a> Text<'a> {
    /// Creates a view over the UTF-16 encoding of `s`.
    pub fn new(s: &'a str) -> Self {
        let repr = if s.is_ascii() {
            Repr::Ascii(s.as_bytes())
        } else {
            Repr::Units(Cow::Owned(s.encode_utf16().collect()))
        };
        Self { repr }
    }

    /// Creates a view over UTF-16 code units without copying them.
    pub fn from_units(units: &'a [u16]) -> Self {
        Self {
            repr: Repr::Units(Cow::Borrowed(units)),
        }
    }
}

impl<'a> From<&'a str> for Text<'a> {
    fn from(s: &'a str) -> Self {
        Self::new(s)
    }
}

impl Sequence for Text<'_> {
    #[inline]
    fn len(&self) -> usize {
        match &self.repr {
            Repr::Ascii(bytes) => bytes.len(),
            Repr::Units(units) => units.len(),
        }
    }

    #[inline]
    fn symbol(&self, i: usize) -> usize {
        match &self.repr {
            Repr::Ascii(bytes) => bytes[i] as usize,
            Repr::Units(units) => units[i] as usize,
        }
    }

    fn max_symbol_hint(&self) -> Option<usize> {
        Some(u16::MAX as usize)
    }
}

/// An error that occurs when the input cannot be suffix sorted.
///
/// Every check runs before the output is touched, so no partial result is ever produced.
///
/// # Example
/// ```
/// use sais::{BuildError, SuffixArrayBuilder};
///
/// let result = SuffixArrayBuilder::new().max_symbol(3).build::<_, u32>(&[1u8, 4, 2][..]);
///
/// assert_eq!(
///     result,
///     Err(BuildError::SymbolOutOfRange {
///         index: 1,
///         symbol: 4,
///         max_symbol: 3
///     })
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// A symbol exceeds the declared maximum symbol
    SymbolOutOfRange {
        /// Position of the offending symbol
        index: usize,
        /// The offending symbol
        symbol: usize,
        /// The declared maximum symbol
        max_symbol: usize,
    },
    /// The index type cannot hold every offset of the input
    TooLong {
        /// Length of the input
        len: usize,
        /// Longest input the index type supports
        max_len: usize,
    },
    /// The alphabet is too large to size bucket tables from
    AlphabetTooLarge {
        /// The declared or largest present symbol
        max_symbol: usize,
        /// Largest symbol supported for this input
        limit: usize,
    },
    /// The output buffer and the input differ in length
    LengthMismatch {
        /// Length of the input
        text: usize,
        /// Length of the output buffer
        suffix_array: usize,
    },
}

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            BuildError::SymbolOutOfRange {
                index,
                symbol,
                max_symbol,
            } => write!(
                f,
                "symbol {} at index {} exceeds maximum symbol {}",
                symbol, index, max_symbol
            ),
            BuildError::TooLong { len, max_len } => write!(
                f,
                "input of length {} is too long for the index type, at most {} is supported",
                len, max_len
            ),
            BuildError::AlphabetTooLarge { max_symbol, limit } => write!(
                f,
                "maximum symbol {} is too large, at most {} is supported",
                max_symbol, limit
            ),
            BuildError::LengthMismatch { text, suffix_array } => write!(
                f,
                "input has length {} but suffix array buffer has length {}",
                text, suffix_array
            ),
        }
    }
}

impl Error for BuildError {}

/// Largest symbol always accepted; longer inputs may use symbols up to their length.
pub const MAX_SYMBOL: usize = u16::MAX as usize;

/// Configures and runs suffix array construction.
///
/// # Example
/// ```
/// use sais::SuffixArrayBuilder;
///
/// let s: Vec<u32> = vec![2, 1, 2, 1, 1, 2, 1, 1, 2, 1, 2];
///
/// let sa = SuffixArrayBuilder::new()
///     .max_symbol(2)
///     .build::<_, u8>(&s)
///     .unwrap();
///
/// assert_eq!(sa, vec![3, 6, 9, 1, 4, 7, 10, 2, 5, 8, 0]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct SuffixArrayBuilder {
    max_symbol: Option<usize>,
}

impl SuffixArrayBuilder {
    /// Creates a builder that takes the alphabet bound from the input.
    pub fn new() -> Self {
        Self { max_symbol: None }
    }

    /// Declares the largest symbol of the input.
    ///
    /// Bucket tables are sized from it, and every symbol is checked against it. It may not
    /// exceed the larger of [`MAX_SYMBOL`] and the input length.
    pub fn max_symbol(mut self, max_symbol: usize) -> Self {
        self.max_symbol = Some(max_symbol);
        self
    }

    /// Construct the suffix array of `s` into a newly allocated vector.
    ///
    /// # Errors
    ///
    /// Returns an error if a symbol exceeds the declared maximum symbol, if the alphabet is too
    /// large or if `I` cannot hold every offset of `s`.
    pub fn build<S, I>(&self, s: &S) -> Result<Vec<I>, BuildError>
    where
        S: Sequence + ?Sized,
        I: Char,
    {
        let mut sa = vec![I::zero(); s.len()];
        self.construct(s, &mut sa)?;
        Ok(sa)
    }

    /// Construct the suffix array of `s` into `sa`.
    ///
    /// # Errors
    ///
    /// Returns an error if `sa` and `s` differ in length, if a symbol exceeds the declared
    /// maximum symbol, if the alphabet exceeds the larger of [`MAX_SYMBOL`] and the length of
    /// `s`, or if `I` cannot hold every offset of `s`. `sa` is left untouched then.
    pub fn construct<S, I>(&self, s: &S, sa: &mut [I]) -> Result<(), BuildError>
    where
        S: Sequence + ?Sized,
        I: Char,
    {
        if s.len() != sa.len() {
            return Err(BuildError::LengthMismatch {
                text: s.len(),
                suffix_array: sa.len(),
            });
        }

        // the largest value of `I` marks unfilled slots
        let max_len = I::max_value().to_u();
        if s.len() > max_len {
            return Err(BuildError::TooLong {
                len: s.len(),
                max_len,
            });
        }

        let max_symbol = self.alphabet(s)?;

        debug!(
            "constructing suffix array: length {}, max symbol {}",
            s.len(),
            max_symbol
        );

        sais::sais(s, max_symbol, sa);

        Ok(())
    }

    fn alphabet<S: Sequence + ?Sized>(&self, s: &S) -> Result<usize, BuildError> {
        // bucket tables stay O(n) past the 16-bit alphabet
        let limit = s.len().max(MAX_SYMBOL);

        if let Some(max_symbol) = self.max_symbol {
            if max_symbol > limit {
                return Err(BuildError::AlphabetTooLarge { max_symbol, limit });
            }
            for index in 0..s.len() {
                let symbol = s.symbol(index);
                if symbol > max_symbol {
                    return Err(BuildError::SymbolOutOfRange {
                        index,
                        symbol,
                        max_symbol,
                    });
                }
            }
            return Ok(max_symbol);
        }

        let max_symbol = s
            .max_symbol_hint()
            .unwrap_or_else(|| (0..s.len()).map(|i| s.symbol(i)).max().unwrap_or(0));
        if max_symbol > limit {
            return Err(BuildError::AlphabetTooLarge { max_symbol, limit });
        }

        Ok(max_symbol)
    }
}

/// Construct suffix array.
///
/// Runs in O(N+|Σ|) time. The alphabet bound is implied by the input type: 255 for bytes,
/// 65535 for `u16` and [`Text`], the largest symbol present for wider integers.
/// That bound may not exceed the larger of [`MAX_SYMBOL`] and the input length.
/// # Arguments
/// - `s`: Input sequence
/// # Example
/// ```
/// let s = b"abracadabra";
///
/// let sa = sais::build(&s[..]).unwrap();
///
/// assert_eq!(sa, vec![10, 7, 0, 3, 5, 8, 1, 4, 6, 9, 2]);
/// ```
///
/// # Errors
///
/// Returns an error if `s` has more than `u32::MAX` symbols, or if it holds a symbol larger
/// than both [`MAX_SYMBOL`] and its length.
pub fn build<S: Sequence + ?Sized>(s: &S) -> Result<Vec<u32>, BuildError> {
    SuffixArrayBuilder::new().build(s)
}

/// Construct suffix array into a caller provided buffer.
///
/// # Arguments
/// - `s`: Input sequence
/// - `sa`: Output suffix array, same length as `s`
/// # Example
/// ```
/// let s = b"aababcabddabcab$";
///
/// let mut sa = vec![0u8; s.len()];
///
/// sais::construct(&s[..], &mut sa).unwrap();
///
/// assert_eq!(sa, vec![15, 0, 13, 1, 10, 3, 6, 14, 2, 11, 4, 7, 12, 5, 9, 8]);
/// ```
///
/// # Errors
///
/// See [`SuffixArrayBuilder::construct`].
pub fn construct<S, I>(s: &S, sa: &mut [I]) -> Result<(), BuildError>
where
    S: Sequence + ?Sized,
    I: Char,
{
    SuffixArrayBuilder::new().construct(s, sa)
}
