use maud::{html, Markup, PreEscaped, Render};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::page::{ContentTag, TextSlot};
use crate::plan::dto::{DayPlan, Macros, Meal};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("day {0} is not a valid UNIX timestamp")]
    InvalidDay(i64),
    #[error("encode calendar events: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Which way the results container shows a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    Calendar,
    #[default]
    Grid,
}

impl RenderMode {
    pub fn render(self, days: &[DayPlan]) -> Result<RenderedPlan, RenderError> {
        match self {
            RenderMode::Calendar => render_calendar(days),
            RenderMode::Grid => render_grid(days),
        }
    }
}

impl std::str::FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "calendar" => Ok(RenderMode::Calendar),
            "grid" => Ok(RenderMode::Grid),
            other => Err(format!("unknown view '{}', expected grid or calendar", other)),
        }
    }
}

/// Contents of the results container after one successful submission.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedPlan {
    Calendar(CalendarView),
    Grid(Vec<DayCard>),
}

impl RenderedPlan {
    /// Number of rendered day units (events or cards).
    pub fn units(&self) -> usize {
        match self {
            RenderedPlan::Calendar(cal) => cal.events.len(),
            RenderedPlan::Grid(cards) => cards.len(),
        }
    }

    pub(crate) fn text_slots(&mut self) -> Vec<TextSlot<'_>> {
        match self {
            // Event bodies are drawn by the widget, not by content elements.
            RenderedPlan::Calendar(_) => Vec::new(),
            RenderedPlan::Grid(cards) => cards.iter_mut().flat_map(DayCard::text_slots).collect(),
        }
    }
}

impl Render for RenderedPlan {
    fn render(&self) -> Markup {
        match self {
            RenderedPlan::Calendar(cal) => cal.render(),
            RenderedPlan::Grid(cards) => html! {
                div.plan-grid {
                    @for card in cards { (card) }
                }
            },
        }
    }
}

// ---- calendar ----

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub title: String,
    pub start: String,
    pub all_day: bool,
    pub extended_props: EventBody,
}

/// Pre-formatted HTML fragments injected by the `eventContent` callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventBody {
    pub meals: String,
    pub snacks: String,
    pub macros: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarView {
    pub events: Vec<CalendarEvent>,
    events_json: String,
}

const CALENDAR_INIT: &str = r#"
(function () {
  var el = document.getElementById("calendar");
  var events = JSON.parse(el.dataset.events);
  var calendar = new FullCalendar.Calendar(el, {
    initialView: "dayGridMonth",
    events: events,
    eventContent: function (arg) {
      var p = arg.event.extendedProps;
      return { html: '<div class="fc-event-title">' + [p.meals, p.snacks, p.macros, p.notes].join("<br>") + "</div>" };
    }
  });
  calendar.render();
})();
"#;

impl Render for CalendarView {
    fn render(&self) -> Markup {
        html! {
            div #calendar data-events=(self.events_json) {}
            script { (PreEscaped(CALENDAR_INIT)) }
        }
    }
}

fn labelled_line(label: &str, text: &str) -> String {
    html! { strong { (label) ":" } " " (text) }.into_string()
}

fn item_lines(items: &[Meal]) -> String {
    items
        .iter()
        .map(|m| labelled_line(&m.kind, &m.description))
        .collect::<Vec<_>>()
        .join("<br>")
}

fn calendar_event(day: &DayPlan) -> Result<CalendarEvent, RenderError> {
    let start = OffsetDateTime::from_unix_timestamp(day.day)
        .ok()
        .and_then(|d| d.format(&Rfc3339).ok())
        .ok_or(RenderError::InvalidDay(day.day))?;

    let macros = day
        .macros
        .map(|m| {
            labelled_line(
                "Macros",
                &format!("Protein: {}, Carbs: {}, Fats: {}", m.protein, m.carbs, m.fats),
            )
        })
        .unwrap_or_default();
    let notes = day
        .notes
        .as_deref()
        .filter(|n| !n.is_empty())
        .map(|n| labelled_line("Notes", n))
        .unwrap_or_default();

    Ok(CalendarEvent {
        title: String::new(),
        start,
        all_day: true,
        extended_props: EventBody {
            meals: item_lines(&day.meals),
            snacks: item_lines(&day.snacks),
            macros,
            notes,
        },
    })
}

pub fn render_calendar(days: &[DayPlan]) -> Result<RenderedPlan, RenderError> {
    let events = days
        .iter()
        .map(calendar_event)
        .collect::<Result<Vec<_>, _>>()?;
    let events_json = serde_json::to_string(&events)?;
    debug!(events = events.len(), "calendar events built");
    Ok(RenderedPlan::Calendar(CalendarView {
        events,
        events_json,
    }))
}

// ---- grid ----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealCategory {
    /// Display order of the grid sections.
    pub const ALL: [MealCategory; 4] = [
        MealCategory::Breakfast,
        MealCategory::Lunch,
        MealCategory::Dinner,
        MealCategory::Snack,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MealCategory::Breakfast => "Breakfast",
            MealCategory::Lunch => "Lunch",
            MealCategory::Dinner => "Dinner",
            MealCategory::Snack => "Snack",
        }
    }

    /// Matches "Breakfast", "late lunch", "Afternoon Snack" and so on.
    /// Snack is tried first so "Pre-dinner snack" stays a snack.
    pub fn classify(kind: &str) -> Option<Self> {
        const PRECEDENCE: [MealCategory; 4] = [
            MealCategory::Snack,
            MealCategory::Breakfast,
            MealCategory::Lunch,
            MealCategory::Dinner,
        ];
        let kind = kind.to_lowercase();
        PRECEDENCE
            .into_iter()
            .find(|c| kind.contains(&c.label().to_lowercase()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MealSection {
    pub label: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayCard {
    pub date_label: String,
    pub sections: Vec<MealSection>,
    pub macros_heading: String,
    pub macro_lines: Vec<String>,
    pub notes_heading: String,
    pub notes: Option<String>,
}

impl DayCard {
    fn text_slots(&mut self) -> Vec<TextSlot<'_>> {
        let mut slots = vec![TextSlot::new(ContentTag::H3, &mut self.date_label)];
        for section in &mut self.sections {
            slots.push(TextSlot::new(ContentTag::H4, &mut section.label));
            slots.extend(section.items.iter_mut().map(|i| TextSlot::new(ContentTag::Li, i)));
        }
        if !self.macro_lines.is_empty() {
            slots.push(TextSlot::new(ContentTag::H4, &mut self.macros_heading));
            slots.extend(self.macro_lines.iter_mut().map(|l| TextSlot::new(ContentTag::Li, l)));
        }
        if let Some(notes) = self.notes.as_mut() {
            slots.push(TextSlot::new(ContentTag::H4, &mut self.notes_heading));
            slots.push(TextSlot::new(ContentTag::P, notes));
        }
        slots
    }

    /// Every item line of the card, in display order.
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

impl Render for DayCard {
    fn render(&self) -> Markup {
        html! {
            div.day-card {
                h3 { (self.date_label) }
                @for section in &self.sections {
                    div.meal-section {
                        h4 { (section.label) }
                        ul {
                            @for item in &section.items { li { (item) } }
                        }
                    }
                }
                @if !self.macro_lines.is_empty() {
                    div.macros {
                        h4 { (self.macros_heading) }
                        ul {
                            @for line in &self.macro_lines { li { (line) } }
                        }
                    }
                }
                @if let Some(notes) = &self.notes {
                    div.notes {
                        h4 { (self.notes_heading) }
                        p { (notes) }
                    }
                }
            }
        }
    }
}

pub(crate) fn date_label(day: i64) -> Result<String, RenderError> {
    let format = format_description!(
        "[weekday], [month repr:long] [day padding:none], [year]"
    );
    OffsetDateTime::from_unix_timestamp(day)
        .ok()
        .and_then(|d| d.format(&format).ok())
        .ok_or(RenderError::InvalidDay(day))
}

fn macro_lines(m: &Macros) -> Vec<String> {
    let mut lines = vec![
        format!("Protein: {}g", m.protein),
        format!("Carbs: {}g", m.carbs),
        format!("Fats: {}g", m.fats),
    ];
    if let Some(kcal) = m.calories {
        lines.push(format!("Calories: {} kcal", kcal));
    }
    lines
}

fn day_card(day: &DayPlan) -> Result<DayCard, RenderError> {
    let mut known: Vec<Vec<String>> = vec![Vec::new(); MealCategory::ALL.len()];
    let mut other: Vec<MealSection> = Vec::new();

    for meal in &day.meals {
        match MealCategory::classify(&meal.kind) {
            Some(c) => known[c as usize].push(meal.description.clone()),
            None => match other.iter_mut().find(|s| s.label == meal.kind) {
                Some(section) => section.items.push(meal.description.clone()),
                None => other.push(MealSection {
                    label: meal.kind.clone(),
                    items: vec![meal.description.clone()],
                }),
            },
        }
    }
    for snack in &day.snacks {
        match MealCategory::classify(&snack.kind) {
            Some(c) => known[c as usize].push(snack.description.clone()),
            None => warn!(
                day = day.day,
                kind = %snack.kind,
                description = %snack.description,
                "snack with unknown category dropped from card"
            ),
        }
    }

    let mut sections: Vec<MealSection> = MealCategory::ALL
        .into_iter()
        .zip(known)
        .filter(|(_, items)| !items.is_empty())
        .map(|(c, items)| MealSection {
            label: c.label().to_string(),
            items,
        })
        .collect();
    sections.extend(other);

    Ok(DayCard {
        date_label: date_label(day.day)?,
        sections,
        macros_heading: "Macros".into(),
        macro_lines: day.macros.as_ref().map(macro_lines).unwrap_or_default(),
        notes_heading: "Notes".into(),
        notes: day.notes.clone().filter(|n| !n.is_empty()),
    })
}

pub fn render_grid(days: &[DayPlan]) -> Result<RenderedPlan, RenderError> {
    let cards = days.iter().map(day_card).collect::<Result<Vec<_>, _>>()?;
    Ok(RenderedPlan::Grid(cards))
}

#[cfg(test)]
mod render_tests {
    use super::*;

    fn meal(kind: &str, description: &str) -> Meal {
        Meal {
            kind: kind.into(),
            description: description.into(),
        }
    }

    fn sample_day() -> DayPlan {
        DayPlan {
            day: 1_700_000_000,
            meals: vec![meal("Breakfast", "Oatmeal")],
            snacks: vec![],
            macros: Some(Macros {
                protein: 60.0,
                carbs: 200.0,
                fats: 50.0,
                calories: None,
            }),
            notes: Some("Stay hydrated".into()),
        }
    }

    #[test]
    fn grid_card_matches_example_day() {
        let RenderedPlan::Grid(cards) = render_grid(&[sample_day()]).unwrap() else {
            panic!("expected grid");
        };
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.date_label, "Tuesday, November 14, 2023");
        assert_eq!(
            card.sections,
            vec![MealSection {
                label: "Breakfast".into(),
                items: vec!["Oatmeal".into()]
            }]
        );
        assert_eq!(card.macro_lines, vec!["Protein: 60g", "Carbs: 200g", "Fats: 50g"]);
        assert_eq!(card.notes.as_deref(), Some("Stay hydrated"));
    }

    #[test]
    fn grid_groups_by_category_in_fixed_order() {
        let mut day = sample_day();
        day.meals = vec![
            meal("Dinner", "Curry"),
            meal("breakfast", "Toast"),
            meal("Late Lunch", "Wrap"),
        ];
        day.snacks = vec![meal("Afternoon Snack", "Apple"), meal("Snack", "Nuts")];
        let RenderedPlan::Grid(cards) = render_grid(&[day]).unwrap() else {
            panic!("expected grid");
        };
        let labels: Vec<_> = cards[0].sections.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Breakfast", "Lunch", "Dinner", "Snack"]);
        assert_eq!(cards[0].sections[3].items, vec!["Apple", "Nuts"]);
        assert_eq!(cards[0].item_count(), 5);
    }

    #[test]
    fn snack_wins_over_meal_names_in_the_type() {
        assert_eq!(MealCategory::classify("Pre-dinner snack"), Some(MealCategory::Snack));
        assert_eq!(MealCategory::classify("Breakfast snack"), Some(MealCategory::Snack));
        assert_eq!(MealCategory::classify("Early Dinner"), Some(MealCategory::Dinner));
        assert_eq!(MealCategory::classify("Brunch"), None);
    }

    #[test]
    fn grid_drops_unknown_snack_but_keeps_unknown_meal() {
        let mut day = sample_day();
        day.meals.push(meal("Brunch", "Eggs"));
        day.snacks = vec![meal("Treat", "Chocolate")];
        let RenderedPlan::Grid(cards) = render_grid(&[day]).unwrap() else {
            panic!("expected grid");
        };
        let html = cards[0].render().into_string();
        assert!(html.contains("Eggs"));
        assert!(html.contains("Brunch"));
        assert!(!html.contains("Chocolate"));
    }

    #[test]
    fn grid_renders_one_card_per_day() {
        let days: Vec<_> = (0..5)
            .map(|i| {
                let mut d = sample_day();
                d.day += i * 86_400;
                d
            })
            .collect();
        let plan = render_grid(&days).unwrap();
        assert_eq!(plan.units(), 5);
        assert_eq!(plan.render().into_string().matches("day-card").count(), 5);
    }

    #[test]
    fn calendar_keeps_unknown_types_verbatim() {
        let mut day = sample_day();
        day.snacks = vec![meal("Treat", "Chocolate")];
        let RenderedPlan::Calendar(cal) = render_calendar(&[day]).unwrap() else {
            panic!("expected calendar");
        };
        let event = &cal.events[0];
        assert!(event.all_day);
        assert_eq!(event.start, "2023-11-14T22:13:20Z");
        assert_eq!(event.extended_props.snacks, "<strong>Treat:</strong> Chocolate");
        assert_eq!(
            event.extended_props.macros,
            "<strong>Macros:</strong> Protein: 60, Carbs: 200, Fats: 50"
        );
    }

    #[test]
    fn calendar_escapes_descriptions_and_joins_lines() {
        let mut day = sample_day();
        day.meals = vec![meal("Lunch", "<b>Soup</b>"), meal("Dinner", "Fish & chips")];
        let RenderedPlan::Calendar(cal) = render_calendar(&[day]).unwrap() else {
            panic!("expected calendar");
        };
        assert_eq!(
            cal.events[0].extended_props.meals,
            "<strong>Lunch:</strong> &lt;b&gt;Soup&lt;/b&gt;<br><strong>Dinner:</strong> Fish &amp; chips"
        );
    }

    #[test]
    fn calendar_events_serialize_for_the_widget() {
        let plan = render_calendar(&[sample_day()]).unwrap();
        let RenderedPlan::Calendar(cal) = &plan else {
            panic!("expected calendar");
        };
        let json = serde_json::to_value(&cal.events).unwrap();
        assert_eq!(json[0]["allDay"], true);
        assert_eq!(json[0]["title"], "");
        assert!(json[0]["extendedProps"]["notes"]
            .as_str()
            .unwrap()
            .ends_with("Stay hydrated"));
        assert!(plan.render().into_string().contains("dayGridMonth"));
    }

    #[test]
    fn out_of_range_day_is_an_error() {
        let mut day = sample_day();
        day.day = i64::MAX;
        assert!(matches!(render_grid(&[day.clone()]), Err(RenderError::InvalidDay(_))));
        assert!(matches!(render_calendar(&[day]), Err(RenderError::InvalidDay(_))));
    }
}
