pub mod content_view;
pub mod history_list;
pub mod quiz_view;
pub mod search_form;
