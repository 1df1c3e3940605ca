use maud::{html, Markup, DOCTYPE};

use super::controller::PlanForm;
use super::languages::LANGUAGES;
use super::render::RenderedPlan;

const FULLCALENDAR_JS: &str =
    "https://cdn.jsdelivr.net/npm/fullcalendar@6.1.15/index.global.min.js";

/// Element kinds whose text the translation controller collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTag {
    H1,
    H2,
    H3,
    H4,
    P,
    Li,
    Label,
    Button,
}

impl ContentTag {
    pub const TRANSLATABLE: &'static [ContentTag] = &[
        ContentTag::H1,
        ContentTag::H2,
        ContentTag::H3,
        ContentTag::H4,
        ContentTag::P,
        ContentTag::Li,
        ContentTag::Label,
        ContentTag::Button,
    ];

    /// Headings, paragraphs and list items only.
    pub const PROSE: &'static [ContentTag] = &[
        ContentTag::H1,
        ContentTag::H2,
        ContentTag::H3,
        ContentTag::H4,
        ContentTag::P,
        ContentTag::Li,
    ];
}

/// Writable text content of one element.
pub struct TextSlot<'a> {
    tag: ContentTag,
    text: &'a mut String,
}

impl<'a> TextSlot<'a> {
    pub fn new(tag: ContentTag, text: &'a mut String) -> Self {
        Self { tag, text }
    }

    pub fn tag(&self) -> ContentTag {
        self.tag
    }

    pub fn text(&self) -> &str {
        self.text
    }

    pub fn set(&mut self, text: String) {
        *self.text = text;
    }
}

/// The page surface the controllers read from and write to.
pub trait View {
    fn read_form(&self) -> PlanForm;
    /// Blocking, user-facing message.
    fn alert(&mut self, message: &str);
    fn set_loading(&mut self, visible: bool);
    /// Replaces whatever the results container showed before.
    fn show_plan(&mut self, plan: RenderedPlan);
    fn selected_language(&self) -> Option<String>;
    /// Disables the translate trigger and shows its indicator, or undoes both.
    fn set_translating(&mut self, active: bool);
    /// Text-bearing elements in document order.
    fn text_slots(&mut self) -> Vec<TextSlot<'_>>;
}

#[derive(Debug, Clone)]
struct Chrome {
    title: String,
    intro: String,
    calorie_label: String,
    diet_label: String,
    submit_button: String,
    language_label: String,
    translate_button: String,
    translating_text: String,
    loading_text: String,
}

impl Default for Chrome {
    fn default() -> Self {
        Self {
            title: "Diet Plan Generator".into(),
            intro: "Enter your daily calorie limit to get a personalised weekly plan.".into(),
            calorie_label: "Daily calorie limit".into(),
            diet_label: "Diet type".into(),
            submit_button: "Generate plan".into(),
            language_label: "Language".into(),
            translate_button: "Translate".into(),
            translating_text: "Translating...".into(),
            loading_text: "Generating your diet plan...".into(),
        }
    }
}

/// In-memory page: form state, indicators, results and the alerts raised.
#[derive(Debug, Clone)]
pub struct Page {
    chrome: Chrome,
    form: PlanForm,
    diet_types: Option<Vec<String>>,
    language: Option<String>,
    results: Option<RenderedPlan>,
    alerts: Vec<String>,
    loading: bool,
    translating: bool,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    pub fn new() -> Self {
        let diet_types = ["balanced", "vegan", "vegetarian", "keto", "paleo", "mediterranean"]
            .into_iter()
            .map(String::from)
            .collect();
        Self {
            chrome: Chrome::default(),
            form: PlanForm {
                calory_limit: String::new(),
                diet_type: Some(String::new()),
            },
            diet_types: Some(diet_types),
            language: None,
            results: None,
            alerts: Vec::new(),
            loading: false,
            translating: false,
        }
    }

    /// Page variant with no diet-type selector.
    pub fn without_diet_type() -> Self {
        let mut page = Self::new();
        page.diet_types = None;
        page.form.diet_type = None;
        page
    }

    pub fn fill_form(&mut self, calory_limit: &str, diet_type: Option<&str>) {
        self.form.calory_limit = calory_limit.to_string();
        if self.diet_types.is_some() {
            self.form.diet_type = Some(diet_type.unwrap_or_default().to_string());
        }
    }

    pub fn select_language(&mut self, code: Option<&str>) {
        self.language = code.map(str::to_string);
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn results(&self) -> Option<&RenderedPlan> {
        self.results.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_translating(&self) -> bool {
        self.translating
    }

    pub fn translate_enabled(&self) -> bool {
        !self.translating
    }

    pub fn to_markup(&self) -> Markup {
        let c = &self.chrome;
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (c.title) }
                    script src=(FULLCALENDAR_JS) {}
                }
                body {
                    header {
                        h1 { (c.title) }
                        p.intro { (c.intro) }
                    }
                    @if !self.alerts.is_empty() {
                        div.alerts {
                            @for a in &self.alerts { div.alert role="alert" { (a) } }
                        }
                    }
                    form #calorieForm {
                        label for="caloryLimit" { (c.calorie_label) }
                        input #caloryLimit type="number" name="calory_limit" min="1"
                            value=(self.form.calory_limit);
                        @if let Some(diets) = &self.diet_types {
                            label for="dietType" { (c.diet_label) }
                            select #dietType name="diet_type" {
                                @for d in diets {
                                    option value=(d) selected[self.form.diet_type.as_deref() == Some(d.as_str())] { (d) }
                                }
                            }
                        }
                        button type="submit" { (c.submit_button) }
                    }
                    div.translate-bar {
                        label for="language" { (c.language_label) }
                        select #language {
                            option value="" { "--" }
                            @for (code, name) in LANGUAGES {
                                option value=(code) selected[self.language.as_deref() == Some(*code)] { (name) }
                            }
                        }
                        button #translateBtn type="button" disabled[self.translating] { (c.translate_button) }
                        p #translating hidden[!self.translating] { (c.translating_text) }
                    }
                    p #loading hidden[!self.loading] { (c.loading_text) }
                    div #results {
                        @if let Some(plan) = &self.results { (plan) }
                    }
                }
            }
        }
    }
}

impl View for Page {
    fn read_form(&self) -> PlanForm {
        self.form.clone()
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn set_loading(&mut self, visible: bool) {
        self.loading = visible;
    }

    fn show_plan(&mut self, plan: RenderedPlan) {
        self.results = Some(plan);
    }

    fn selected_language(&self) -> Option<String> {
        self.language.clone()
    }

    fn set_translating(&mut self, active: bool) {
        self.translating = active;
    }

    fn text_slots(&mut self) -> Vec<TextSlot<'_>> {
        let c = &mut self.chrome;
        let mut slots = vec![
            TextSlot::new(ContentTag::H1, &mut c.title),
            TextSlot::new(ContentTag::P, &mut c.intro),
            TextSlot::new(ContentTag::Label, &mut c.calorie_label),
        ];
        if self.diet_types.is_some() {
            slots.push(TextSlot::new(ContentTag::Label, &mut c.diet_label));
        }
        slots.extend([
            TextSlot::new(ContentTag::Button, &mut c.submit_button),
            TextSlot::new(ContentTag::Label, &mut c.language_label),
            TextSlot::new(ContentTag::Button, &mut c.translate_button),
            TextSlot::new(ContentTag::P, &mut c.translating_text),
            TextSlot::new(ContentTag::P, &mut c.loading_text),
        ]);
        if let Some(plan) = self.results.as_mut() {
            slots.extend(plan.text_slots());
        }
        slots
    }
}
