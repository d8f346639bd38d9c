pub mod actions;
pub mod epg;
pub mod grouper;
pub mod lineup;
pub mod m3u_parser;
pub mod source;
