use std::io;

use file_converter::action::cli::process_args;

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if let Some(output) = process_args(args)? {
        log::info!("程式執行完成，輸出位置：{}", output);
        println!("轉換完成！輸出檔案位於：{}", output);
    }
    Ok(())
}
