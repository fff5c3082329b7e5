use std::path::PathBuf;

use vman_bytecode::{Colors, dump_with};

use super::inspector::ProcessInspector;
use super::loader::load_or_exit;

pub struct DumpArgs {
    pub image_path: PathBuf,
    pub color: bool,
}

pub fn run(args: DumpArgs) {
    let program = load_or_exit(&args.image_path);
    let colors = Colors::new(args.color);
    print!("{}", dump_with(&program, colors, &ProcessInspector));
}
