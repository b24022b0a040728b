// leaf.rs - Terminal matchers: literal, character class, anchor, back reference.
//
// A leaf consumes input without consulting its continuation. The functions
// here return the end position of the leaf alone; `Graph::attempt` chains
// them into the continuation and `LeafRepeat` iterates them directly.

use bitflags::bitflags;
use smallvec::SmallVec;

// ============================================================================
// BitSet (256 bits for the Latin-1 block of a character class)
// ============================================================================

const BITS_IN_ROOM: usize = 32;
const SINGLE_BYTE_SIZE: usize = 256;
const BITSET_REAL_SIZE: usize = SINGLE_BYTE_SIZE / BITS_IN_ROOM;

type BitSet = [u32; BITSET_REAL_SIZE];

#[inline]
fn bs_room(pos: usize) -> usize {
    pos >> 5
}

#[inline]
fn bs_bit(pos: usize) -> u32 {
    1u32 << (pos & 0x1f)
}

#[inline]
fn bitset_at(bs: &BitSet, pos: usize) -> bool {
    (bs[bs_room(pos)] & bs_bit(pos)) != 0
}

#[inline]
fn bitset_set_bit(bs: &mut BitSet, pos: usize) {
    bs[bs_room(pos)] |= bs_bit(pos);
}

// ============================================================================
// Character helpers
// ============================================================================

#[inline]
pub(crate) fn char_at(input: &str, pos: usize) -> Option<char> {
    input[pos..].chars().next()
}

#[inline]
fn char_before(input: &str, pos: usize) -> Option<char> {
    input[..pos].chars().next_back()
}

#[inline]
pub(crate) fn is_word_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Simple case fold: the single-character lowercase mapping, or `c` itself
/// when lowercasing expands to several characters.
fn fold(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

#[inline]
fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || fold(a) == fold(b)
}

// ============================================================================
// Literal
// ============================================================================

/// Match `text` at `pos`, returning the end of the matched input.
pub fn match_literal(text: &str, ignore_case: bool, input: &str, pos: usize) -> Option<usize> {
    if !ignore_case {
        return input[pos..]
            .as_bytes()
            .starts_with(text.as_bytes())
            .then(|| pos + text.len());
    }
    let mut rest = input[pos..].chars();
    let mut end = pos;
    for p in text.chars() {
        let c = rest.next()?;
        if !eq_ignore_case(p, c) {
            return None;
        }
        end += c.len_utf8();
    }
    Some(end)
}

// ============================================================================
// Character class
// ============================================================================

bitflags! {
    /// Modifiers of a [`CharClass`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClassFlags: u8 {
        /// `[^...]`
        const NEGATED = 1 << 0;
        /// Match either case of a member.
        const IGNORE_CASE = 1 << 1;
    }
}

/// Shorthand classes `\d`, `\w`, `\s`.
///
/// `\d` is ASCII digits only; `\w` and `\s` follow Unicode alphanumeric and
/// whitespace properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerlClass {
    Digit,
    Word,
    Space,
}

impl PerlClass {
    pub fn contains(self, c: char) -> bool {
        match self {
            PerlClass::Digit => c.is_ascii_digit(),
            PerlClass::Word => is_word_char(c),
            PerlClass::Space => c.is_whitespace(),
        }
    }
}

/// A set of characters.
///
/// Code points below 256 are resolved through a bitset filled at
/// construction; others consult the range list and shorthand classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharClass {
    bits: BitSet,
    ranges: SmallVec<[(char, char); 4]>,
    perl: SmallVec<[(PerlClass, bool); 2]>,
    flags: ClassFlags,
}

impl Default for CharClass {
    fn default() -> Self {
        Self::new()
    }
}

impl CharClass {
    /// An empty class (matches nothing until members are added).
    pub fn new() -> Self {
        CharClass {
            bits: [0; BITSET_REAL_SIZE],
            ranges: SmallVec::new(),
            perl: SmallVec::new(),
            flags: ClassFlags::empty(),
        }
    }

    /// `.`: any character, `\n` excluded unless `dot_all`.
    pub fn any(dot_all: bool) -> Self {
        let class = if dot_all {
            Self::new()
        } else {
            Self::new().with_char('\n')
        };
        class.negated()
    }

    pub fn digit() -> Self {
        Self::new().with_perl(PerlClass::Digit)
    }

    pub fn word() -> Self {
        Self::new().with_perl(PerlClass::Word)
    }

    pub fn space() -> Self {
        Self::new().with_perl(PerlClass::Space)
    }

    pub fn with_char(self, c: char) -> Self {
        self.with_range(c, c)
    }

    /// Add `lo..=hi`. An inverted range adds nothing.
    pub fn with_range(mut self, lo: char, hi: char) -> Self {
        if lo > hi {
            return self;
        }
        let (lo_u, hi_u) = (lo as usize, hi as usize);
        for cp in lo_u..=hi_u.min(SINGLE_BYTE_SIZE - 1) {
            bitset_set_bit(&mut self.bits, cp);
        }
        if hi_u >= SINGLE_BYTE_SIZE {
            let lo = if lo_u < SINGLE_BYTE_SIZE { '\u{100}' } else { lo };
            self.ranges.push((lo, hi));
        }
        self
    }

    pub fn with_perl(self, class: PerlClass) -> Self {
        self.with_perl_item(class, false)
    }

    /// Add the complement of a shorthand class, as in `[\D]`.
    pub fn with_not_perl(self, class: PerlClass) -> Self {
        self.with_perl_item(class, true)
    }

    fn with_perl_item(mut self, class: PerlClass, negated: bool) -> Self {
        for cp in 0..SINGLE_BYTE_SIZE {
            let c = char::from(cp as u8);
            if class.contains(c) != negated {
                bitset_set_bit(&mut self.bits, cp);
            }
        }
        self.perl.push((class, negated));
        self
    }

    /// Invert the class.
    pub fn negated(mut self) -> Self {
        self.flags.toggle(ClassFlags::NEGATED);
        self
    }

    pub fn ignore_case(mut self) -> Self {
        self.flags.insert(ClassFlags::IGNORE_CASE);
        self
    }

    pub fn flags(&self) -> ClassFlags {
        self.flags
    }

    fn contains(&self, c: char) -> bool {
        let cp = c as usize;
        if cp < SINGLE_BYTE_SIZE {
            return bitset_at(&self.bits, cp);
        }
        self.ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi)
            || self.perl.iter().any(|&(p, neg)| p.contains(c) != neg)
    }

    /// Membership test honouring `NEGATED` and `IGNORE_CASE`.
    pub fn matches(&self, c: char) -> bool {
        let mut hit = self.contains(c);
        if !hit && self.flags.contains(ClassFlags::IGNORE_CASE) {
            hit = c.to_lowercase().any(|l| self.contains(l))
                || c.to_uppercase().any(|u| self.contains(u));
        }
        hit != self.flags.contains(ClassFlags::NEGATED)
    }
}

/// Match one character of `class` at `pos`.
#[inline]
pub fn match_class(class: &CharClass, input: &str, pos: usize) -> Option<usize> {
    let c = char_at(input, pos)?;
    class.matches(c).then(|| pos + c.len_utf8())
}

// ============================================================================
// Anchor
// ============================================================================

/// Zero-width assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// `\A`
    StartText,
    /// `\z`
    EndText,
    /// `\Z`: end of input, or before a final `\n`.
    EndTextOptionalNewline,
    /// `^` in multiline mode.
    StartLine,
    /// `$` in multiline mode.
    EndLine,
    /// `\b`
    WordBoundary,
    /// `\B`
    NotWordBoundary,
    /// `\G`: the position the current search began at.
    StartPosition,
}

impl Anchor {
    /// Whether the assertion holds at `pos`. `origin` is where the current
    /// search began.
    pub fn is_at(self, input: &str, pos: usize, origin: usize) -> bool {
        let bytes = input.as_bytes();
        match self {
            Anchor::StartText => pos == 0,
            Anchor::EndText => pos == input.len(),
            Anchor::EndTextOptionalNewline => {
                pos == input.len() || (pos + 1 == input.len() && bytes[pos] == b'\n')
            }
            Anchor::StartLine => pos == 0 || bytes[pos - 1] == b'\n',
            Anchor::EndLine => pos == input.len() || bytes[pos] == b'\n',
            Anchor::WordBoundary => is_word_boundary(input, pos),
            Anchor::NotWordBoundary => !is_word_boundary(input, pos),
            Anchor::StartPosition => pos == origin,
        }
    }
}

fn is_word_boundary(input: &str, pos: usize) -> bool {
    let before = char_before(input, pos).is_some_and(is_word_char);
    let after = char_at(input, pos).is_some_and(is_word_char);
    before != after
}

// ============================================================================
// Back reference
// ============================================================================

/// Match the text captured at `captured` again at `pos`. An unset group
/// never matches.
pub fn match_backref(
    captured: Option<(usize, usize)>,
    ignore_case: bool,
    input: &str,
    pos: usize,
) -> Option<usize> {
    let (start, end) = captured?;
    match_literal(&input[start..end], ignore_case, input, pos)
}
