use gauntlet_core::Viewport;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct PanelProps {
    pub title: AttrValue,
    #[prop_or_default]
    pub subtitle: AttrValue,
    pub button: AttrValue,
    pub onclick: Callback<()>,
}

/// Title card used for the intro and win screens of every game.
#[function_component]
pub(crate) fn Panel(props: &PanelProps) -> Html {
    let onclick = {
        let callback = props.onclick.clone();
        Callback::from(move |e: MouseEvent| {
            // the play area behind the card counts clicks too
            e.stop_propagation();
            callback.emit(());
        })
    };

    html! {
        <div class="panel">
            <h1 class="title">{props.title.clone()}</h1>
            <h2 class="title">{props.subtitle.clone()}</h2>
            <button {onclick}>{props.button.clone()}</button>
        </div>
    }
}

/// Helper function to use JavaScript's Math.random
pub(crate) fn js_random_seed() -> u64 {
    use js_sys::Math::random;
    u64::from_be_bytes([
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
        (256. * random()) as u8,
    ])
}

pub(crate) fn current_viewport() -> Viewport {
    let window = gloo::utils::window();
    let dimension = |value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        value.ok().and_then(|value| value.as_f64()).unwrap_or(0.0)
    };
    Viewport::new(dimension(window.inner_width()), dimension(window.inner_height()))
}

/// "1 mistake", "3 mistakes"
pub(crate) fn count_noun(count: u32, noun: &str) -> String {
    match count {
        1 => format!("1 {}", noun),
        _ => format!("{} {}s", count, noun),
    }
}
