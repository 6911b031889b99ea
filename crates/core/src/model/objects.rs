//! Operator records consumed by the interpreter.
//!
//! The upstream document model parses raw page syntax into a linear
//! sequence of [`Op`] records: an operator tag plus its ordered,
//! typed operands. Nothing here touches bytes; tokenization happens
//! before this crate is involved.

use bytes::Bytes;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::error::{RenderError, Result};

/// One instruction of a content stream: a tag plus ordered operands.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Op {
    pub tag: OpTag,
    pub operands: Vec<Operand>,
}

impl Op {
    pub fn new(tag: OpTag, operands: Vec<Operand>) -> Self {
        Self { tag, operands }
    }

    /// Builds an operator from its content-stream mnemonic.
    pub fn named(name: &str, operands: Vec<Operand>) -> Self {
        Self::new(OpTag::parse(name), operands)
    }
}

/// Closed enumeration of the operator vocabulary.
///
/// Unrecognized mnemonics are preserved in [`OpTag::Other`] so the
/// interpreter can log and skip them instead of failing upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpTag {
    // Graphics state: q Q cm w J j M d ri i gs
    SaveState,
    RestoreState,
    Concat,
    LineWidth,
    LineCap,
    LineJoin,
    MiterLimit,
    Dash,
    RenderingIntent,
    Flatness,
    ExtGState,
    // Path construction: m l c v y h re
    MoveTo,
    LineTo,
    CurveTo,
    CurveToInitial,
    CurveToFinal,
    ClosePath,
    Rectangle,
    // Path painting: S s f F f* B B* b b* n
    Stroke,
    CloseStroke,
    Fill,
    FillEvenOdd,
    FillStroke,
    FillStrokeEvenOdd,
    CloseFillStroke,
    CloseFillStrokeEvenOdd,
    EndPath,
    // Clipping: W W*
    Clip,
    ClipEvenOdd,
    // Color: G g RG rg K k CS cs SC SCN sc scn
    StrokeGray,
    FillGray,
    StrokeRgb,
    FillRgb,
    StrokeCmyk,
    FillCmyk,
    StrokeColorSpace,
    FillColorSpace,
    StrokeColor,
    FillColor,
    // XObjects and inline images: Do, BI..ID..EI
    XObject,
    InlineImage,
    // Text: BT ET Tc Tw Tz TL Tf Tr Ts Td TD Tm T* Tj TJ ' "
    BeginText,
    EndText,
    CharSpacing,
    WordSpacing,
    HorizScaling,
    Leading,
    SelectFont,
    TextRenderMode,
    TextRise,
    TextMove,
    TextMoveSetLeading,
    TextMatrix,
    NextLine,
    ShowText,
    ShowTextAdjusted,
    NextLineShowText,
    NextLineSetSpacingShowText,
    // Marked content: BMC BDC EMC MP DP
    BeginMarkedContent,
    BeginMarkedContentProps,
    EndMarkedContent,
    MarkedContentPoint,
    MarkedContentPointProps,
    /// Anything outside the known vocabulary.
    Other(SmolStr),
}

impl OpTag {
    /// Maps a content-stream mnemonic to its tag.
    pub fn parse(name: &str) -> Self {
        match name {
            "q" => Self::SaveState,
            "Q" => Self::RestoreState,
            "cm" => Self::Concat,
            "w" => Self::LineWidth,
            "J" => Self::LineCap,
            "j" => Self::LineJoin,
            "M" => Self::MiterLimit,
            "d" => Self::Dash,
            "ri" => Self::RenderingIntent,
            "i" => Self::Flatness,
            "gs" => Self::ExtGState,
            "m" => Self::MoveTo,
            "l" => Self::LineTo,
            "c" => Self::CurveTo,
            "v" => Self::CurveToInitial,
            "y" => Self::CurveToFinal,
            "h" => Self::ClosePath,
            "re" => Self::Rectangle,
            "S" => Self::Stroke,
            "s" => Self::CloseStroke,
            "f" | "F" => Self::Fill,
            "f*" => Self::FillEvenOdd,
            "B" => Self::FillStroke,
            "B*" => Self::FillStrokeEvenOdd,
            "b" => Self::CloseFillStroke,
            "b*" => Self::CloseFillStrokeEvenOdd,
            "n" => Self::EndPath,
            "W" => Self::Clip,
            "W*" => Self::ClipEvenOdd,
            "G" => Self::StrokeGray,
            "g" => Self::FillGray,
            "RG" => Self::StrokeRgb,
            "rg" => Self::FillRgb,
            "K" => Self::StrokeCmyk,
            "k" => Self::FillCmyk,
            "CS" => Self::StrokeColorSpace,
            "cs" => Self::FillColorSpace,
            "SC" | "SCN" => Self::StrokeColor,
            "sc" | "scn" => Self::FillColor,
            "Do" => Self::XObject,
            "BI" => Self::InlineImage,
            "BT" => Self::BeginText,
            "ET" => Self::EndText,
            "Tc" => Self::CharSpacing,
            "Tw" => Self::WordSpacing,
            "Tz" => Self::HorizScaling,
            "TL" => Self::Leading,
            "Tf" => Self::SelectFont,
            "Tr" => Self::TextRenderMode,
            "Ts" => Self::TextRise,
            "Td" => Self::TextMove,
            "TD" => Self::TextMoveSetLeading,
            "Tm" => Self::TextMatrix,
            "T*" => Self::NextLine,
            "Tj" => Self::ShowText,
            "TJ" => Self::ShowTextAdjusted,
            "'" => Self::NextLineShowText,
            "\"" => Self::NextLineSetSpacingShowText,
            "BMC" => Self::BeginMarkedContent,
            "BDC" => Self::BeginMarkedContentProps,
            "EMC" => Self::EndMarkedContent,
            "MP" => Self::MarkedContentPoint,
            "DP" => Self::MarkedContentPointProps,
            other => Self::Other(SmolStr::new(other)),
        }
    }

    /// The content-stream mnemonic, for log messages.
    pub fn mnemonic(&self) -> &str {
        match self {
            Self::SaveState => "q",
            Self::RestoreState => "Q",
            Self::Concat => "cm",
            Self::LineWidth => "w",
            Self::LineCap => "J",
            Self::LineJoin => "j",
            Self::MiterLimit => "M",
            Self::Dash => "d",
            Self::RenderingIntent => "ri",
            Self::Flatness => "i",
            Self::ExtGState => "gs",
            Self::MoveTo => "m",
            Self::LineTo => "l",
            Self::CurveTo => "c",
            Self::CurveToInitial => "v",
            Self::CurveToFinal => "y",
            Self::ClosePath => "h",
            Self::Rectangle => "re",
            Self::Stroke => "S",
            Self::CloseStroke => "s",
            Self::Fill => "f",
            Self::FillEvenOdd => "f*",
            Self::FillStroke => "B",
            Self::FillStrokeEvenOdd => "B*",
            Self::CloseFillStroke => "b",
            Self::CloseFillStrokeEvenOdd => "b*",
            Self::EndPath => "n",
            Self::Clip => "W",
            Self::ClipEvenOdd => "W*",
            Self::StrokeGray => "G",
            Self::FillGray => "g",
            Self::StrokeRgb => "RG",
            Self::FillRgb => "rg",
            Self::StrokeCmyk => "K",
            Self::FillCmyk => "k",
            Self::StrokeColorSpace => "CS",
            Self::FillColorSpace => "cs",
            Self::StrokeColor => "SC",
            Self::FillColor => "sc",
            Self::XObject => "Do",
            Self::InlineImage => "BI",
            Self::BeginText => "BT",
            Self::EndText => "ET",
            Self::CharSpacing => "Tc",
            Self::WordSpacing => "Tw",
            Self::HorizScaling => "Tz",
            Self::Leading => "TL",
            Self::SelectFont => "Tf",
            Self::TextRenderMode => "Tr",
            Self::TextRise => "Ts",
            Self::TextMove => "Td",
            Self::TextMoveSetLeading => "TD",
            Self::TextMatrix => "Tm",
            Self::NextLine => "T*",
            Self::ShowText => "Tj",
            Self::ShowTextAdjusted => "TJ",
            Self::NextLineShowText => "'",
            Self::NextLineSetSpacingShowText => "\"",
            Self::BeginMarkedContent => "BMC",
            Self::BeginMarkedContentProps => "BDC",
            Self::EndMarkedContent => "EMC",
            Self::MarkedContentPoint => "MP",
            Self::MarkedContentPointProps => "DP",
            Self::Other(name) => name.as_str(),
        }
    }
}

/// Typed operand of an operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f64),
    Name(SmolStr),
    Str(Vec<u8>),
    Array(Vec<Operand>),
    Dict(FxHashMap<SmolStr, Operand>),
    InlineImage(InlineImage),
}

impl Operand {
    /// Kind name for type-error messages.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Name(_) => "name",
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Dict(_) => "dict",
            Self::InlineImage(_) => "inline image",
        }
    }

    pub fn as_number(&self) -> Result<f64> {
        match self {
            Self::Number(n) => Ok(*n),
            other => Err(RenderError::Type {
                expected: "number",
                got: other.kind(),
            }),
        }
    }

    pub fn as_name(&self) -> Result<&SmolStr> {
        match self {
            Self::Name(name) => Ok(name),
            other => Err(RenderError::Type {
                expected: "name",
                got: other.kind(),
            }),
        }
    }

    pub fn as_str(&self) -> Result<&[u8]> {
        match self {
            Self::Str(bytes) => Ok(bytes),
            other => Err(RenderError::Type {
                expected: "string",
                got: other.kind(),
            }),
        }
    }

    pub fn as_array(&self) -> Result<&[Operand]> {
        match self {
            Self::Array(items) => Ok(items),
            other => Err(RenderError::Type {
                expected: "array",
                got: other.kind(),
            }),
        }
    }

    pub fn as_inline_image(&self) -> Result<&InlineImage> {
        match self {
            Self::InlineImage(img) => Ok(img),
            other => Err(RenderError::Type {
                expected: "inline image",
                got: other.kind(),
            }),
        }
    }
}

/// Payload of a `BI .. ID .. EI` sequence, surfaced by the upstream
/// parser as a single operand: the image parameter dictionary plus
/// the still-encoded sample data.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub params: FxHashMap<SmolStr, Operand>,
    pub data: Bytes,
}
