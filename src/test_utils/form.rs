use scraper::{ElementRef, Html, Selector};

fn select<'a>(element: &ElementRef<'a>, selector: &str) -> impl Iterator<Item = ElementRef<'a>> {
    let selector = Selector::parse(selector).unwrap();
    element.select(&selector).collect::<Vec<_>>().into_iter()
}

#[track_caller]
fn must_get_input<'a>(form: &ElementRef<'a>, name: &str) -> ElementRef<'a> {
    select(form, &format!("input[name=\"{name}\"]"))
        .next()
        .unwrap_or_else(|| panic!("No input found with name \"{name}\""))
}

#[track_caller]
fn assert_required_input_of_type(input: &ElementRef<'_>, name: &str, type_: &str) {
    let got_type = input.value().attr("type").unwrap_or_default();
    assert_eq!(got_type, type_, "want input {name} with type \"{type_}\", got {got_type:?}");
    assert!(
        input.value().attr("required").is_some(),
        "want input {name} to have the required attribute but got none"
    );
}

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

/// Assert that `form` sends its request to `endpoint` with the HTMX `attribute`,
/// e.g. "hx-post" or "hx-put".
#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let got = form
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("{attribute} attribute missing"));

    assert_eq!(got, endpoint, "want form with {attribute}=\"{endpoint}\", got {got:?}");
}

/// Assert that `form` has a required input called `name` of type `type_`.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let input = must_get_input(form, name);

    assert_required_input_of_type(&input, name, type_);
}

/// Like [assert_form_input], and the input is pre-filled with `value`.
#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    let input = must_get_input(form, name);

    assert_required_input_of_type(&input, name, type_);
    let got_value = input.value().attr("value").unwrap_or_default();
    assert_eq!(got_value, value, "want input {name} with value \"{value}\", got {got_value:?}");
}

/// The values of the options in the select called `name`.
#[track_caller]
pub(crate) fn form_select_options(form: &ElementRef<'_>, name: &str) -> Vec<String> {
    let select_element = select(form, &format!("select[name=\"{name}\"]"))
        .next()
        .unwrap_or_else(|| panic!("No select found with name \"{name}\""));

    select(&select_element, "option")
        .map(|option| option.value().attr("value").unwrap_or_default().to_owned())
        .collect()
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let button = select(form, "button").next().expect("No button found");

    assert_eq!(
        button.value().attr("type").unwrap_or_default(),
        "submit",
        "want submit button with type=\"submit\""
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button_with_text(form: &ElementRef<'_>, text: &str) {
    assert_form_submit_button(form);

    let button = select(form, "button").next().expect("No button found");
    assert_eq!(button.text().collect::<String>().trim(), text);
}

/// Assert that the first paragraph in `form` is the error message.
#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want_error_message: &str) {
    let paragraph = select(form, "p").next().expect("No error message found");

    assert_eq!(want_error_message, paragraph.text().collect::<String>().trim());
}
