//! Top-to-bottom card composition.
//!
//! Fields are laid out in a fixed order below a single running cursor. The
//! code image, its caption and the footer are anchored to the bottom of the
//! canvas and never move with the text.

use image::{Rgba, RgbaImage};
use tracing::{debug, warn};

use super::CardError;
use super::spec::{CardSpec, OverflowPolicy};
use super::surface::Surface;
use crate::record::WorkRecord;
use crate::text::{Faces, FontRole, TextMeasure, wrap_with};

/// Vertical position of the next text block. Only ever moves down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutCursor {
    y: i64,
}

impl LayoutCursor {
    pub fn new(top: u32) -> Self {
        Self { y: i64::from(top) }
    }

    pub fn y(&self) -> i64 {
        self.y
    }

    pub fn advance(&mut self, by: u32) {
        self.y += i64::from(by);
    }
}

/// Blocks of the card, in drawing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Creator,
    Grade,
    Divider,
    Title,
    Medium,
    Size,
    Concept,
    Story,
}

/// Where a block landed and how many rows it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedField {
    pub field: Field,
    pub top: i64,
    pub lines: usize,
}

/// Summary of one composed card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLayout {
    pub fields: Vec<PlacedField>,
    /// Bottom of the last text row, before the trailing gap.
    pub text_bottom: i64,
    /// Cursor position once every block and gap is consumed.
    pub cursor_end: i64,
    /// Lowest y the text may reach without touching the anchored caption.
    pub text_floor: i64,
    pub code_origin: (i64, i64),
}

impl CardLayout {
    pub fn field(&self, field: Field) -> Option<&PlacedField> {
        self.fields.iter().find(|placed| placed.field == field)
    }

    pub fn overflows(&self) -> bool {
        self.text_bottom > self.text_floor
    }
}

/// Paint `record` onto `surface`.
///
/// `code` is pasted as-is at the bottom-right anchor. Under
/// [`OverflowPolicy::Error`] nothing below the text is drawn when the text
/// runs past the caption.
pub fn compose<S: Surface>(
    record: &WorkRecord,
    spec: &CardSpec,
    faces: &Faces<S::Face>,
    code: &RgbaImage,
    surface: &mut S,
) -> Result<CardLayout, CardError> {
    let mut composer = Composer {
        spec,
        faces,
        surface,
        cursor: LayoutCursor::new(spec.margin),
        fields: Vec::new(),
    };
    composer.background();
    let text_bottom = composer.text_flow(record)?;

    let small = faces.get(FontRole::Small).line_height();
    let text_floor = spec.text_floor(small);
    if text_bottom > text_floor {
        match spec.overflow {
            OverflowPolicy::Error => {
                return Err(CardError::Overflow {
                    id: record.file_stem().to_string(),
                    text_bottom,
                    floor: text_floor,
                });
            }
            OverflowPolicy::Allow => warn!(
                id = record.file_stem(),
                text_bottom, text_floor, "card text runs into the code caption"
            ),
        }
    }
    composer.anchored(code);

    let layout = CardLayout {
        fields: composer.fields,
        text_bottom,
        cursor_end: composer.cursor.y(),
        text_floor,
        code_origin: spec.code_origin(),
    };
    debug!(
        id = record.file_stem(),
        text_bottom,
        cursor_end = layout.cursor_end,
        "card composed"
    );
    Ok(layout)
}

struct Composer<'a, S: Surface> {
    spec: &'a CardSpec,
    faces: &'a Faces<S::Face>,
    surface: &'a mut S,
    cursor: LayoutCursor,
    fields: Vec<PlacedField>,
}

impl<S: Surface> Composer<'_, S> {
    fn background(&mut self) {
        let palette = &self.spec.palette;
        self.surface.fill(palette.background.into());
        self.surface.draw_border(palette.border.into());
    }

    /// Lay out the flowing text and return the bottom of its last row.
    fn text_flow(&mut self, record: &WorkRecord) -> Result<i64, CardError> {
        let spec = self.spec;
        let palette = &spec.palette;
        let labels = &spec.labels;

        let title_height = self.faces.get(FontRole::Title).line_height();
        self.single_line(
            Field::Creator,
            &record.creator,
            FontRole::Title,
            palette.creator.into(),
            title_height + spec.line_spacing,
        );
        if !record.grade.is_empty() {
            let body_height = self.faces.get(FontRole::Body).line_height();
            self.single_line(
                Field::Grade,
                &record.grade,
                FontRole::Body,
                palette.grade.into(),
                body_height + 2 * spec.line_spacing,
            );
        }
        self.divider();

        let body = palette.body.into();
        self.paragraph(
            Field::Title,
            &record.bracketed_title(),
            FontRole::Subtitle,
            body,
        )?;
        self.cursor.advance(spec.section_gap);
        self.paragraph(
            Field::Medium,
            &format!("{}{}", labels.medium, record.medium),
            FontRole::Body,
            body,
        )?;
        self.paragraph(
            Field::Size,
            &format!("{}{}", labels.size, record.size),
            FontRole::Body,
            body,
        )?;
        self.cursor.advance(spec.section_gap);
        self.paragraph(
            Field::Concept,
            &format!("{}{}", labels.concept, record.concept),
            FontRole::Body,
            body,
        )?;
        let mut text_bottom = self.cursor.y();
        self.cursor.advance(spec.story_gap);

        if spec.include_story {
            self.paragraph(
                Field::Story,
                &format!("{}{}", labels.story, record.story),
                FontRole::Body,
                body,
            )?;
            text_bottom = self.cursor.y();
            self.cursor.advance(spec.story_gap);
        }
        Ok(text_bottom)
    }

    /// Draw unwrapped text and move the cursor by a fixed amount.
    fn single_line(
        &mut self,
        field: Field,
        text: &str,
        role: FontRole,
        color: Rgba<u8>,
        advance: u32,
    ) {
        let top = self.cursor.y();
        let face = self.faces.get(role);
        self.surface
            .draw_text(i64::from(self.spec.margin), top, text, face, color);
        self.fields.push(PlacedField {
            field,
            top,
            lines: 1,
        });
        self.cursor.advance(advance);
    }

    fn divider(&mut self) {
        let spec = self.spec;
        let top = self.cursor.y();
        let y = top + i64::from(spec.divider_offset);
        let left = i64::from(spec.margin);
        let right = i64::from(spec.width) - i64::from(spec.margin);
        self.surface.draw_rule(
            (left, y),
            (right, y),
            spec.divider_thickness,
            spec.palette.divider.into(),
        );
        self.fields.push(PlacedField {
            field: Field::Divider,
            top,
            lines: 0,
        });
        self.cursor.advance(spec.divider_advance);
    }

    /// Wrap `text` to the usable width and draw it row by row.
    fn paragraph(
        &mut self,
        field: Field,
        text: &str,
        role: FontRole,
        color: Rgba<u8>,
    ) -> Result<(), CardError> {
        let spec = self.spec;
        let face = self.faces.get(role);
        let wrapped = wrap_with(face, text, spec.usable_width())?;
        let row_height = face.line_height() + spec.line_spacing;
        let top = self.cursor.y();
        let left = i64::from(spec.margin);
        for (idx, line) in wrapped.iter().enumerate() {
            let y = top + idx as i64 * i64::from(row_height);
            self.surface.draw_text(left, y, &line.text, face, color);
        }
        self.fields.push(PlacedField {
            field,
            top,
            lines: wrapped.len(),
        });
        self.cursor
            .advance(wrapped.height(face.line_height(), spec.line_spacing));
        Ok(())
    }

    /// Code image, caption and footer; independent of the cursor.
    fn anchored(&mut self, code: &RgbaImage) {
        let spec = self.spec;
        let small = self.faces.get(FontRole::Small);
        let (code_x, code_y) = spec.code_origin();
        self.surface.paste(code, code_x, code_y);

        let (caption_x, caption_y) = spec.caption_origin(small.line_height());
        self.surface.draw_text(
            caption_x,
            caption_y,
            &spec.labels.caption,
            small,
            spec.palette.caption.into(),
        );
        let (footer_x, footer_y) = spec.footer_origin(small.line_height());
        self.surface.draw_text(
            footer_x,
            footer_y,
            &spec.labels.footer,
            small,
            spec.palette.footer.into(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::LayoutError;
    use pretty_assertions::assert_eq;

    /// Fixed advance per character: narrow for ASCII, wide otherwise.
    struct FixedFace {
        size: u32,
        fail_on: Option<char>,
    }

    impl FixedFace {
        fn new(size: u32) -> Self {
            Self {
                size,
                fail_on: None,
            }
        }
    }

    impl TextMeasure for FixedFace {
        fn text_width(&self, text: &str) -> Result<u32, LayoutError> {
            if let Some(bad) = self.fail_on {
                if text.contains(bad) {
                    return Err(LayoutError::Measure {
                        text: text.to_string(),
                        reason: "glyph missing".to_string(),
                    });
                }
            }
            Ok(text
                .chars()
                .map(|ch| if ch.is_ascii() { 14 } else { 28 })
                .sum())
        }

        fn line_height(&self) -> u32 {
            self.size
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        Fill,
        Border,
        Text { x: i64, y: i64, text: String },
        Rule { from: (i64, i64), to: (i64, i64), thickness: u32 },
        Paste { x: i64, y: i64, size: (u32, u32) },
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl Recorder {
        fn text_y(&self, needle: &str) -> Option<i64> {
            self.ops.iter().find_map(|op| match op {
                Op::Text { y, text, .. } if text == needle => Some(*y),
                _ => None,
            })
        }

        fn texts(&self) -> Vec<&str> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Text { text, .. } => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Surface for Recorder {
        type Face = FixedFace;

        fn fill(&mut self, _color: Rgba<u8>) {
            self.ops.push(Op::Fill);
        }

        fn draw_border(&mut self, _color: Rgba<u8>) {
            self.ops.push(Op::Border);
        }

        fn draw_text(
            &mut self,
            x: i64,
            y: i64,
            text: &str,
            _face: &FixedFace,
            _color: Rgba<u8>,
        ) {
            self.ops.push(Op::Text {
                x,
                y,
                text: text.to_string(),
            });
        }

        fn draw_rule(
            &mut self,
            from: (i64, i64),
            to: (i64, i64),
            thickness: u32,
            _color: Rgba<u8>,
        ) {
            self.ops.push(Op::Rule {
                from,
                to,
                thickness,
            });
        }

        fn paste(&mut self, image: &RgbaImage, x: i64, y: i64) {
            self.ops.push(Op::Paste {
                x,
                y,
                size: image.dimensions(),
            });
        }
    }

    fn faces() -> Faces<FixedFace> {
        Faces {
            title: FixedFace::new(46),
            subtitle: FixedFace::new(30),
            body: FixedFace::new(28),
            small: FixedFace::new(22),
        }
    }

    fn record() -> WorkRecord {
        WorkRecord {
            id: "w1".to_string(),
            creator: "王小明".to_string(),
            grade: "三年級".to_string(),
            // 18 + 10 wide chars: wraps to two rows at 560px
            title: format!("{} {}", "山".repeat(18), "水".repeat(10)),
            medium: "水彩".to_string(),
            size: "30x40 cm".to_string(),
            concept: "光影".to_string(),
            story: "從校園出發".to_string(),
        }
    }

    fn code() -> RgbaImage {
        RgbaImage::new(220, 220)
    }

    fn run(record: &WorkRecord, spec: &CardSpec) -> (Result<CardLayout, CardError>, Recorder) {
        let mut recorder = Recorder::default();
        let result = compose(record, spec, &faces(), &code(), &mut recorder);
        (result, recorder)
    }

    #[test]
    fn cursor_only_moves_down() {
        let mut cursor = LayoutCursor::new(70);
        cursor.advance(0);
        cursor.advance(38);
        assert_eq!(cursor.y(), 108);
    }

    #[test]
    fn next_field_starts_after_rows_and_gap() {
        let (result, recorder) = run(&record(), &CardSpec::default());
        let layout = result.unwrap();

        let title = layout.field(Field::Title).unwrap();
        assert_eq!(title.lines, 2);
        assert_eq!(title.top, 70 + (46 + 8) + (28 + 16) + 60);

        let medium = layout.field(Field::Medium).unwrap();
        assert_eq!(medium.lines, 1);
        assert_eq!(medium.top, title.top + 2 * (30 + 8) + 18);
        assert_eq!(recorder.text_y("媒材：水彩"), Some(medium.top));

        let size = layout.field(Field::Size).unwrap();
        assert_eq!(size.top, medium.top + 28 + 8);
    }

    #[test]
    fn title_rows_are_stacked_by_line_height_plus_spacing() {
        let (result, recorder) = run(&record(), &CardSpec::default());
        let top = result.unwrap().field(Field::Title).unwrap().top;
        let first = format!("< {}", "山".repeat(18));
        let second = format!("{} >", "水".repeat(10));
        assert_eq!(recorder.text_y(&first), Some(top));
        assert_eq!(recorder.text_y(&second), Some(top + 38));
    }

    #[test]
    fn fields_are_drawn_in_fixed_order() {
        let (result, recorder) = run(&record(), &CardSpec::default());
        let layout = result.unwrap();
        let order: Vec<Field> = layout.fields.iter().map(|f| f.field).collect();
        assert_eq!(
            order,
            vec![
                Field::Creator,
                Field::Grade,
                Field::Divider,
                Field::Title,
                Field::Medium,
                Field::Size,
                Field::Concept,
            ]
        );
        assert_eq!(recorder.ops[0], Op::Fill);
        assert_eq!(recorder.ops[1], Op::Border);
        assert_eq!(recorder.texts()[0], "王小明");
        assert_eq!(recorder.texts()[1], "三年級");
    }

    #[test]
    fn divider_sits_below_the_header() {
        let (_, recorder) = run(&record(), &CardSpec::default());
        let rule = recorder
            .ops
            .iter()
            .find(|op| matches!(op, Op::Rule { .. }))
            .cloned();
        assert_eq!(
            rule,
            Some(Op::Rule {
                from: (70, 188),
                to: (630, 188),
                thickness: 2,
            })
        );
    }

    #[test]
    fn missing_grade_is_skipped_without_advancing() {
        let record = WorkRecord {
            grade: String::new(),
            ..record()
        };
        let (result, _) = run(&record, &CardSpec::default());
        let layout = result.unwrap();
        assert!(layout.field(Field::Grade).is_none());
        assert_eq!(layout.field(Field::Title).unwrap().top, 70 + 54 + 60);
    }

    #[test]
    fn empty_title_still_takes_one_row() {
        let record = WorkRecord {
            title: String::new(),
            ..record()
        };
        let (result, _) = run(&record, &CardSpec::default());
        let layout = result.unwrap();
        let title = layout.field(Field::Title).unwrap();
        assert_eq!(title.lines, 1);
        assert_eq!(layout.field(Field::Medium).unwrap().top, title.top + 38 + 18);
    }

    #[test]
    fn anchored_elements_ignore_the_cursor() {
        let (result, recorder) = run(&record(), &CardSpec::default());
        let layout = result.unwrap();
        assert_eq!(layout.code_origin, (410, 1210));
        assert!(recorder.ops.contains(&Op::Paste {
            x: 410,
            y: 1210,
            size: (220, 220),
        }));
        assert!(recorder.ops.contains(&Op::Text {
            x: 410,
            y: 1182,
            text: "作品詳情".to_string(),
        }));
        assert!(recorder.ops.contains(&Op::Text {
            x: 70,
            y: 1408,
            text: "32 屆 · 美術社期末成果展".to_string(),
        }));
    }

    #[test]
    fn story_is_only_drawn_when_enabled() {
        let (result, recorder) = run(&record(), &CardSpec::default());
        assert!(result.unwrap().field(Field::Story).is_none());
        assert!(!recorder.texts().contains(&"創作故事：從校園出發"));

        let spec = CardSpec {
            include_story: true,
            ..CardSpec::default()
        };
        let (result, recorder) = run(&record(), &spec);
        let layout = result.unwrap();
        let concept = layout.field(Field::Concept).unwrap();
        let story = layout.field(Field::Story).unwrap();
        assert_eq!(story.top, concept.top + 36 + 28);
        assert_eq!(layout.text_bottom, story.top + 36);
        assert_eq!(layout.cursor_end, layout.text_bottom + 28);
        assert!(recorder.texts().contains(&"創作故事：從校園出發"));
    }

    #[test]
    fn overflowing_text_is_an_error_by_default() {
        let record = WorkRecord {
            concept: "長".repeat(2000),
            ..record()
        };
        let (result, recorder) = run(&record, &CardSpec::default());
        match result {
            Err(CardError::Overflow {
                id,
                text_bottom,
                floor,
            }) => {
                assert_eq!(id, "w1");
                assert_eq!(floor, 1182);
                assert!(text_bottom > floor);
            }
            other => panic!("expected overflow, got {other:?}"),
        }
        assert!(!recorder.ops.iter().any(|op| matches!(op, Op::Paste { .. })));
    }

    #[test]
    fn overflow_can_be_allowed() {
        let record = WorkRecord {
            concept: "長".repeat(2000),
            ..record()
        };
        let spec = CardSpec {
            overflow: OverflowPolicy::Allow,
            ..CardSpec::default()
        };
        let (result, recorder) = run(&record, &spec);
        let layout = result.unwrap();
        assert!(layout.overflows());
        assert!(recorder.ops.iter().any(|op| matches!(op, Op::Paste { .. })));
    }

    #[test]
    fn measurement_failures_abort_the_card() {
        let mut faces = faces();
        faces.body.fail_on = Some('彩');
        let mut recorder = Recorder::default();
        let result = compose(&record(), &CardSpec::default(), &faces, &code(), &mut recorder);
        assert!(matches!(result, Err(CardError::Layout(LayoutError::Measure { .. }))));
    }
}
