mod helper;
mod meeting_update;
