//! Tag tables for structure roles.
//!
//! Default HTML tags per standard role, list numbering modes and list label
//! parsing for `<ol start type>`.

use crate::object::Object;
use crate::structure::StructType;
use lazy_static::lazy_static;
use phf::phf_map;
use regex::Regex;

lazy_static! {
    /// Leading number of a list label ("3.", "(12)")
    static ref RE_LABEL_NUMBER: Regex = Regex::new(r"^\W*(\d+)").unwrap();

    /// Leading letter run of a list label ("b)", "iv.")
    static ref RE_LABEL_LETTERS: Regex = Regex::new(r"^\W*([A-Za-z]+)").unwrap();

    /// Well-formed roman numeral
    static ref RE_ROMAN: Regex =
        Regex::new(r"^(?i)m{0,4}(cm|cd|d?c{0,3})(xc|xl|l?x{0,3})(ix|iv|v?i{0,3})$").unwrap();
}

/// Default tag for each standard role. Headings, lists, captions and the
/// suppressed roles are decided by context and are not listed.
static ROLE_TAGS: phf::Map<&'static str, &'static str> = phf_map! {
    "Document" => "div",
    "DocumentFragment" => "div",
    "Part" => "div",
    "Art" => "article",
    "Sect" => "section",
    "Div" => "div",
    "Aside" => "aside",
    "BlockQuote" => "blockquote",
    "Index" => "section",
    "FENote" => "aside",
    "Note" => "aside",
    "Sub" => "span",
    "P" => "p",
    "Table" => "table",
    "TR" => "tr",
    "TH" => "th",
    "TD" => "td",
    "THead" => "thead",
    "TBody" => "tbody",
    "TFoot" => "tfoot",
    "Span" => "span",
    "Quote" => "q",
    "Reference" => "a",
    "BibEntry" => "p",
    "Code" => "code",
    "Link" => "a",
    "Annot" => "span",
    "Ruby" => "ruby",
    "RB" => "rb",
    "RT" => "rt",
    "RP" => "rp",
    "Warichu" => "span",
    "WT" => "span",
    "WP" => "span",
    "Figure" => "figure",
    "Formula" => "figure",
    "Form" => "div",
    "Em" => "em",
    "Strong" => "strong",
};

/// MathML elements whose content is a single token.
static MATH_TOKENS: phf::Set<&'static str> = phf::phf_set! {
    "mi", "mn", "mo", "ms", "mtext",
};

/// Default tag for a role; unknown and custom roles become `div`.
pub fn default_tag(role: &StructType) -> &'static str {
    ROLE_TAGS.get(role.name().as_ref()).copied().unwrap_or("div")
}

/// True for MathML token elements.
pub fn is_math_token(name: &str) -> bool {
    MATH_TOKENS.contains(name)
}

/// Numbering mode of a list, from the List owner's `ListNumbering`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListNumbering {
    /// No numbering (also the default)
    #[default]
    None,
    /// Description list
    Description,
    /// Any other numbering name
    Numbered(String),
}

impl ListNumbering {
    /// Read a `ListNumbering` value.
    pub fn from_object(value: &Object) -> Option<Self> {
        let name = value.as_name_or_text()?;
        Some(match name.as_str() {
            "None" => Self::None,
            "Description" => Self::Description,
            _ => Self::Numbered(name),
        })
    }

    /// List container tag.
    pub fn list_tag(&self) -> &'static str {
        match self {
            Self::None => "ul",
            Self::Description => "dl",
            Self::Numbered(_) => "ol",
        }
    }

    /// `type` attribute implied by the numbering name, when there is one.
    pub fn ol_type(&self) -> Option<&'static str> {
        match self {
            Self::Numbered(name) => match name.as_str() {
                "Decimal" => Some("1"),
                "UpperRoman" => Some("I"),
                "LowerRoman" => Some("i"),
                "UpperAlpha" => Some("A"),
                "LowerAlpha" => Some("a"),
                _ => None,
            },
            _ => None,
        }
    }
}

/// What a list label says about its list's numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LabelNumbering {
    /// Value of the first item
    pub start: Option<u32>,
    /// `<ol type>`: `1`, `a`, `A`, `i` or `I`
    pub kind: Option<&'static str>,
}

/// Parse the first label of a list.
///
/// ```
/// use tagged_pdf_html::converters::tags::parse_list_label;
///
/// let label = parse_list_label("iv.");
/// assert_eq!(label.kind, Some("i"));
/// assert_eq!(label.start, Some(4));
/// ```
pub fn parse_list_label(label: &str) -> LabelNumbering {
    if let Some(caps) = RE_LABEL_NUMBER.captures(label) {
        return LabelNumbering {
            start: caps[1].parse().ok(),
            kind: Some("1"),
        };
    }

    let Some(caps) = RE_LABEL_LETTERS.captures(label) else {
        return LabelNumbering::default();
    };
    let letters = &caps[1];
    let upper = letters.chars().all(|c| c.is_ascii_uppercase());

    // A lone "v", "x", "c"... is far more often an alphabetic label.
    let single = letters.len() == 1;
    let roman = RE_ROMAN.is_match(letters) && (!single || letters.eq_ignore_ascii_case("i"));

    if roman {
        LabelNumbering {
            start: roman_value(letters),
            kind: Some(if upper { "I" } else { "i" }),
        }
    } else {
        let start = if single {
            letters
                .bytes()
                .next()
                .map(|b| (b.to_ascii_lowercase() - b'a') as u32 + 1)
        } else {
            None
        };
        LabelNumbering {
            start,
            kind: Some(if upper { "A" } else { "a" }),
        }
    }
}

fn roman_value(numeral: &str) -> Option<u32> {
    let digit = |c: char| match c.to_ascii_lowercase() {
        'i' => 1,
        'v' => 5,
        'x' => 10,
        'l' => 50,
        'c' => 100,
        'd' => 500,
        'm' => 1000,
        _ => 0,
    };
    let values: Vec<i64> = numeral.chars().map(digit).collect();
    let value = values
        .iter()
        .enumerate()
        .fold(0i64, |acc, (i, &v)| match values.get(i + 1) {
            Some(&next) if next > v => acc - v,
            _ => acc + v,
        });
    u32::try_from(value).ok().filter(|&v| v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tags() {
        assert_eq!(default_tag(&StructType::Sect), "section");
        assert_eq!(default_tag(&StructType::Art), "article");
        assert_eq!(default_tag(&StructType::BlockQuote), "blockquote");
        assert_eq!(default_tag(&StructType::Link), "a");
        assert_eq!(default_tag(&StructType::Custom("Chapter".into())), "div");
    }

    #[test]
    fn test_list_numbering() {
        assert_eq!(
            ListNumbering::from_object(&Object::name("Description")).map(|n| n.list_tag()),
            Some("dl")
        );
        assert_eq!(ListNumbering::from_object(&Object::name("None")).map(|n| n.list_tag()), Some("ul"));
        let roman = ListNumbering::from_object(&Object::name("UpperRoman")).unwrap();
        assert_eq!(roman.list_tag(), "ol");
        assert_eq!(roman.ol_type(), Some("I"));
        assert_eq!(ListNumbering::from_object(&Object::Integer(1)), None);
    }

    #[test]
    fn test_parse_numeric_label() {
        let label = parse_list_label("3.");
        assert_eq!(label.start, Some(3));
        assert_eq!(label.kind, Some("1"));
        assert_eq!(parse_list_label("(12)").start, Some(12));
    }

    #[test]
    fn test_parse_alpha_and_roman_labels() {
        assert_eq!(parse_list_label("b)"), LabelNumbering { start: Some(2), kind: Some("a") });
        assert_eq!(parse_list_label("C."), LabelNumbering { start: Some(3), kind: Some("A") });
        assert_eq!(parse_list_label("i."), LabelNumbering { start: Some(1), kind: Some("i") });
        assert_eq!(parse_list_label("XIV"), LabelNumbering { start: Some(14), kind: Some("I") });
        assert_eq!(parse_list_label("v)").kind, Some("a"));
        assert_eq!(parse_list_label("\u{2022}"), LabelNumbering::default());
    }

    #[test]
    fn test_math_tokens() {
        assert!(is_math_token("mi"));
        assert!(!is_math_token("mrow"));
    }
}
