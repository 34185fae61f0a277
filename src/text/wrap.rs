//! Greedy line wrapping for mixed Latin and CJK text.
//!
//! Words are separated by single spaces only, so a CJK run without spaces is
//! one long token. Tokens that do not fit on an empty line are broken per
//! character instead.

/// One visual row of wrapped text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasuredLine {
    pub text: String,
    pub width: u32,
}

impl MeasuredLine {
    /// An empty row; still occupies one line of height when drawn.
    pub fn blank() -> Self {
        Self {
            text: String::new(),
            width: 0,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Rows produced by [`wrap`], top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrapResult {
    pub lines: Vec<MeasuredLine>,
}

impl WrapResult {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MeasuredLine> {
        self.lines.iter()
    }

    #[cfg(test)]
    fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }

    /// Vertical space consumed when every row advances by `line_height + line_spacing`.
    pub fn height(&self, line_height: u32, line_spacing: u32) -> u32 {
        self.lines.len() as u32 * (line_height + line_spacing)
    }
}

impl<'a> IntoIterator for &'a WrapResult {
    type Item = &'a MeasuredLine;
    type IntoIter = std::slice::Iter<'a, MeasuredLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// Wrap `text` into rows no wider than `max_width`.
///
/// Explicit `\n` breaks are always honoured and an empty segment yields one
/// blank row. The only row allowed to exceed `max_width` is a single
/// character that is wider than the budget on its own. Errors from `measure`
/// abort wrapping and are returned as-is.
pub fn wrap<F, E>(text: &str, max_width: u32, mut measure: F) -> Result<WrapResult, E>
where
    F: FnMut(&str) -> Result<u32, E>,
{
    let mut lines = Vec::new();
    for segment in text.split('\n') {
        let segment = segment.strip_suffix('\r').unwrap_or(segment);
        if segment.is_empty() {
            lines.push(MeasuredLine::blank());
            continue;
        }
        wrap_segment(segment, max_width, &mut measure, &mut lines)?;
    }
    Ok(WrapResult { lines })
}

fn wrap_segment<F, E>(
    segment: &str,
    max_width: u32,
    measure: &mut F,
    lines: &mut Vec<MeasuredLine>,
) -> Result<(), E>
where
    F: FnMut(&str) -> Result<u32, E>,
{
    let mut current = MeasuredLine::blank();
    for token in segment.split(' ') {
        loop {
            let candidate = format!("{} {}", current.text, token).trim().to_string();
            let width = measure(&candidate)?;
            if width <= max_width {
                current = MeasuredLine {
                    text: candidate,
                    width,
                };
                break;
            }
            if !current.is_blank() {
                // Finish the row and try the same token again on a fresh one.
                lines.push(std::mem::replace(&mut current, MeasuredLine::blank()));
                continue;
            }
            current = break_token(token, max_width, measure, lines)?;
            break;
        }
    }
    if !current.is_blank() {
        lines.push(current);
    }
    Ok(())
}

/// Character-level fallback for a token wider than a whole row.
///
/// Full rows are pushed onto `lines`; the unfinished tail is returned so the
/// following tokens can continue on it.
fn break_token<F, E>(
    token: &str,
    max_width: u32,
    measure: &mut F,
    lines: &mut Vec<MeasuredLine>,
) -> Result<MeasuredLine, E>
where
    F: FnMut(&str) -> Result<u32, E>,
{
    let mut current = MeasuredLine::blank();
    for ch in token.chars() {
        let mut candidate = current.text.clone();
        candidate.push(ch);
        let width = measure(&candidate)?;
        // A lone character is kept even when it overflows; it cannot be split.
        if width <= max_width || current.is_blank() {
            current = MeasuredLine {
                text: candidate,
                width,
            };
            continue;
        }
        lines.push(std::mem::replace(&mut current, MeasuredLine::blank()));
        let text = ch.to_string();
        let width = measure(&text)?;
        current = MeasuredLine { text, width };
    }
    Ok(current)
}
