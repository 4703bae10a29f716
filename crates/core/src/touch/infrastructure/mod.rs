pub mod rect_key_layout;
