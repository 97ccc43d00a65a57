mod palette_button;

pub use palette_button::PaletteButton;
