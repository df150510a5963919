pub mod countdown_bar;
pub mod dashboard;
pub mod deck_list;
pub mod menu;
pub mod progress_bar;
pub mod typing_area;
pub mod word_list;
