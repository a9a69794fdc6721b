use mtcombo_core::{KeyCode, Rect};
use mtcombo_surface::{Document, Surface, LINE_HEIGHT};
use mtcombo_widgets::prelude::*;
use proptest::collection::vec;
use proptest::prelude::*;

const DEFAULT_PROPTEST_CASES: u32 = 128;

fn proptest_cases() -> u32 {
    std::env::var("MTCOMBO_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_PROPTEST_CASES)
}

fn option_text_strategy() -> BoxedStrategy<String> {
    vec(
        prop_oneof![
            Just('a'),
            Just('b'),
            Just('c'),
            Just('x'),
            Just('0'),
            Just('1'),
            Just(' '),
            Just('-'),
        ],
        0..=6,
    )
    .prop_map(|chars| chars.into_iter().collect())
    .boxed()
}

fn options_strategy() -> BoxedStrategy<Vec<ComboOption>> {
    vec((option_text_strategy(), any::<bool>()), 0..=8)
        .prop_map(|entries| {
            let mut seen_selected = false;
            entries
                .into_iter()
                .enumerate()
                .map(|(index, (text, selected))| {
                    let selected = selected && !seen_selected;
                    seen_selected |= selected;
                    ComboOption::new(format!("{index}{text}"), text).with_selected(selected)
                })
                .collect()
        })
        .boxed()
}

#[derive(Clone, Debug)]
enum UiAction {
    Open,
    ClickRow(usize),
    ClickAdder,
    TypeText(String),
    PressEnter,
}

fn ui_action_strategy() -> BoxedStrategy<UiAction> {
    prop_oneof![
        3 => Just(UiAction::Open),
        3 => any::<usize>().prop_map(UiAction::ClickRow),
        2 => Just(UiAction::ClickAdder),
        2 => option_text_strategy().prop_map(UiAction::TypeText),
        2 => Just(UiAction::PressEnter),
    ]
    .boxed()
}

fn run_action(
    doc: &mut Document,
    combo: &mut ComboBox,
    action: &UiAction,
) -> mtcombo_widgets::Result<()> {
    let events = match action {
        UiAction::Open => doc.click(combo.root()).into_iter().collect(),
        UiAction::ClickRow(pick) => {
            let rows = combo.expansion().map(|list| list.rows()).unwrap_or_default();
            if rows.is_empty() {
                Vec::new()
            } else {
                doc.click(rows[pick % rows.len()]).into_iter().collect()
            }
        }
        UiAction::ClickAdder => match combo.expansion().map(|list| list.adder()) {
            Some(adder) => doc.click(adder).into_iter().collect(),
            None => Vec::new(),
        },
        UiAction::TypeText(text) => match combo.expansion().and_then(|list| list.entry_input()) {
            Some(input) => doc.type_text(input, text)?,
            None => Vec::new(),
        },
        UiAction::PressEnter => doc.press_key_focused(KeyCode::ENTER).into_iter().collect(),
    };
    for event in events {
        combo.handle_event(doc, &event)?;
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: proptest_cases(),
        .. ProptestConfig::default()
    })]

    #[test]
    fn list_is_centered_on_anchor_top(
        x in -500i32..500,
        y in -500i32..500,
        width in 1u16..400,
        height in 1u16..200,
        rows in 0usize..12,
    ) {
        let mut doc = Document::new();
        let anchor = doc.create_element("div");
        doc.append_child(doc.body(), anchor).unwrap();
        let bounds = Rect::new(x as f32, y as f32, f32::from(width), f32::from(height));
        doc.set_bounds(anchor, bounds).unwrap();

        let options: Vec<_> = (0..rows)
            .map(|i| ComboOption::new(format!("row {i}"), i.to_string()))
            .collect();
        let mut list = ExpansionList::build(&mut doc, None, ListConfig::default()).unwrap();
        list.fill(&mut doc, &options).unwrap();
        doc.insert_after(anchor, list.root()).unwrap();

        let placed = list.position_to(&mut doc, anchor).unwrap();
        let list_height = (rows as f32 + 2.0) * LINE_HEIGHT;
        prop_assert_eq!(placed.height(), list_height);
        prop_assert_eq!(placed.top(), bounds.top() - list_height / 2.0);
        prop_assert_eq!(placed.left(), bounds.left());
        prop_assert_eq!(doc.bounding_box(list.root()).unwrap(), placed);
    }

    #[test]
    fn interaction_keeps_a_single_selection(
        options in options_strategy(),
        actions in vec(ui_action_strategy(), 1..=24),
    ) {
        let mut doc = Document::new();
        let select = doc.create_element("select");
        doc.append_child(doc.body(), select).unwrap();
        let mut combo = ComboBox::attach(
            &mut doc,
            select,
            SelectOptions::from_options(options),
            ComboConfig::default(),
        )
        .unwrap();

        for (step, action) in actions.iter().enumerate() {
            let outcome = run_action(&mut doc, &mut combo, action);
            prop_assert!(outcome.is_ok(), "step {step}: {action:?} failed with {outcome:?}");

            let selected = combo.source().selected_indices();
            prop_assert!(selected.len() <= 1, "step {step}: {selected:?} selected");

            let expected = combo
                .source()
                .selected()
                .map(|option| option.text.clone())
                .unwrap_or_else(|| combo.config().placeholder.clone());
            prop_assert_eq!(combo.display_text(&doc).unwrap(), expected);

            let lists = doc.children(doc.body()).unwrap().len() - 2;
            prop_assert_eq!(lists, usize::from(combo.is_expanded()));
            prop_assert_eq!(combo.expansion().is_some(), combo.is_expanded());
        }
    }
}
