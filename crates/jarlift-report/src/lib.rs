mod builder;
mod parser;
mod render;
mod table;

pub use builder::ReportBuilder;
pub use parser::{clean_output, EchoTokenParser, RowParser, ECHO_TOKENS};
pub use render::render_grid;
pub use table::{ReportRow, ReportTable};
