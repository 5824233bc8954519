use image::{Rgba, RgbaImage};
use wordwrap::layout::{Line, SizeFn, SpecConfig, TextBox, Wrapper};
use wordwrap::rich::{parse_rich, text_color};
use wordwrap::{
    colours, rich, BlockFace, DrawOptions, FaceRef, Paint, PixelRect, Surface, WrapError,
};

fn face() -> FaceRef {
    BlockFace::new(1, 1, 0).into_ref()
}

fn texts(lines: &[Line]) -> Vec<String> {
    lines.iter().map(Line::text_value).collect()
}

/// Lay out every page of `text` into `rect`
fn paginate(text: &str, wrapper: &Wrapper, rect: PixelRect) -> Vec<Vec<Line>> {
    let mut session = wrapper.text_session(text, face());
    let mut pages = Vec::new();
    while session.has_next() {
        let (lines, _) = wrapper.text_to_rect(&mut session, rect).expect("page lays out");
        pages.push(lines);
        assert!(pages.len() < 10_000, "layout made no progress");
    }
    pages
}

#[test]
fn short_text_fits_on_one_line() {
    let pages = paginate("word that fits", &Wrapper::new(), PixelRect::sized(15, 1));
    assert_eq!(pages.len(), 1);
    assert_eq!(texts(&pages[0]), vec!["word that fits"]);
}

#[test]
fn narrow_region_wraps_every_word() {
    let pages = paginate("word that fits", &Wrapper::new(), PixelRect::sized(6, 10));
    assert_eq!(pages.len(), 1);
    assert_eq!(texts(&pages[0]), vec!["word ", "that ", "fits"]);
}

#[test]
fn pages_continue_where_the_last_ended() {
    let pages = paginate("aaa bbb ccc ddd eee fff", &Wrapper::new(), PixelRect::sized(10, 2));
    assert_eq!(pages.len(), 2);
    assert_eq!(texts(&pages[0]), vec!["aaa bbb ", "ccc ddd "]);
    assert_eq!(texts(&pages[1]), vec!["eee fff"]);
}

#[test]
fn page_break_marker_ends_a_full_page() {
    let marker = TextBox::new(&face(), "-", Paint::default());
    let wrapper = Wrapper::new().with_page_break(marker);
    let pages = paginate("aaa bbb ccc ddd eee fff", &wrapper, PixelRect::sized(10, 2));

    assert_eq!(pages.len(), 2);
    let last = &pages[0][1];
    assert_eq!(last.len(), 5);
    assert_eq!(last.boxes()[4].kind(), "page break");
    assert_eq!(last.text_value(), "ccc ddd ");
    assert!(pages[1][0].text_value().starts_with("eee"));
    // the last page gets no marker
    assert!(pages[1][0].boxes().iter().all(|b| b.kind() != "page break"));
}

#[test]
fn page_break_marker_keeps_trailing_space() {
    let marker = TextBox::new(&face(), "-", Paint::default());
    let wrapper = Wrapper::new().with_page_break(marker);
    let pages = paginate("aaa bbb ccc ddd eee fff", &wrapper, PixelRect::sized(9, 2));

    let last = &pages[0][1];
    assert_eq!(last.len(), 4);
    assert_eq!(last.text_value(), "ccc ddd ");
    assert_eq!(last.width().ceil(), 8);
    assert_eq!(texts(&pages[1]), vec!["eee fff"]);
}

#[test]
fn words_pushed_by_the_marker_rewrap_on_the_next_page() {
    let wide = BlockFace::new(2, 1, 0).into_ref();
    let wrapper = Wrapper::new().with_page_break(TextBox::new(&wide, "-", Paint::default()));
    let pages = paginate("aaa bbb ccc ddd eee fff", &wrapper, PixelRect::sized(8, 2));

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0][1].text_value(), "ccc ");
    assert_eq!(texts(&pages[1]), vec!["ddd eee ", "fff"]);
}

#[test]
fn page_break_taller_than_region_is_an_error() {
    let tall = BlockFace::new(1, 5, 0).into_ref();
    let wrapper = Wrapper::new().with_page_break(TextBox::new(&tall, "-", Paint::default()));
    let mut session = wrapper.text_session("aaa bbb ccc ddd eee fff", face());
    let err = wrapper
        .text_to_rect(&mut session, PixelRect::sized(10, 2))
        .expect_err("marker cannot fit");
    assert!(matches!(err.root(), WrapError::PageBreakTooTall));
    assert!(err.is_geometry_infeasible());
}

#[test]
fn pagination_loses_no_text() {
    let text = lipsum::lipsum(120);
    let pages = paginate(&text, &Wrapper::new(), PixelRect::sized(40, 7));
    assert!(pages.len() > 1);
    let rebuilt: String = pages.iter().flatten().map(Line::text_value).collect();
    assert_eq!(rebuilt, text);
}

#[test]
fn lines_stay_inside_their_region() {
    let width = 30;
    let text = lipsum::lipsum(200);
    for line in paginate(&text, &Wrapper::new(), PixelRect::sized(width, 12)).iter().flatten() {
        assert!(
            line.width().ceil() < width || line.len() == 1,
            "line {:?} is {} wide",
            line.text_value(),
            line.width()
        );
    }
}

#[test]
fn reset_replays_the_same_layout() {
    let wrapper = Wrapper::new();
    let rect = PixelRect::sized(25, 4);
    let mut session = wrapper.text_session(lipsum::lipsum(60), face());

    let (first, _) = wrapper.text_to_rect(&mut session, rect).expect("first layout");
    session.reset();
    session.reset();
    let (second, _) = wrapper.text_to_rect(&mut session, rect).expect("second layout");
    assert_eq!(texts(&first), texts(&second));
}

#[test]
fn line_stats_count_across_pages() {
    let wrapper = Wrapper::new();
    let mut session = wrapper.text_session("aaa bbb ccc ddd eee fff", face());
    let (first, _) = wrapper.text_to_rect(&mut session, PixelRect::sized(10, 2)).expect("page 1");
    let (second, _) = wrapper.text_to_rect(&mut session, PixelRect::sized(10, 2)).expect("page 2");

    let boxes_before: usize = first.iter().map(Line::len).sum();
    assert_eq!(second[0].stats.page_number, 1);
    assert_eq!(second[0].stats.line_number, 0);
    assert_eq!(second[0].stats.word_offset, boxes_before);
    assert_eq!(session.box_count, boxes_before + second[0].len());
}

#[test]
fn spec_layout_respects_size_functions() {
    let wrapper = Wrapper::new();
    let mut session = wrapper.text_session("aaa bbb ccc", face());

    let unbounded = wrapper
        .text_to_specs(&mut session, &SpecConfig::new())
        .expect("auto layout");
    assert_eq!(unbounded.page_size.x, 11);
    assert_eq!(unbounded.lines.len(), 1);

    let capped = wrapper
        .text_to_specs(
            &mut session,
            &SpecConfig::new().width(SizeFn::min(SizeFn::fixed(8), SizeFn::auto())),
        )
        .expect("capped layout");
    assert_eq!(capped.page_size.x, 8);
    assert_eq!(texts(&capped.lines), vec!["aaa bbb ", "ccc"]);
    assert_eq!(capped.page_size.y, 2);
}

#[test]
fn rich_text_draws_in_its_colours() {
    let text = parse_rich(&rich![face(), "aaa ", text_color(colours::RED, rich!["bbb"])]);
    let wrapper = Wrapper::new();
    let mut session = text.session(&wrapper);
    let rect = PixelRect::sized(10, 1);
    let (lines, _) = wrapper.text_to_rect(&mut session, rect).expect("layout");
    assert_eq!(texts(&lines), vec!["aaa bbb"]);

    let mut img = RgbaImage::new(10, 1);
    wrapper.render_lines(&mut img, &lines, rect, &DrawOptions::default());
    assert_eq!(img.pixel(0, 0), Rgba([0, 0, 0, 255]));
    assert_eq!(img.pixel(3, 0), Rgba([0, 0, 0, 0]));
    assert_eq!(img.pixel(4, 0), Rgba([255, 0, 0, 255]));
}
