use super::ui;
use crate::core::FiatOption;
use comfy_table::Cell;

pub fn display_as_table(options: &[FiatOption]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Currency"),
        ui::header_cell("Symbol"),
    ]);

    for (i, fiat) in options.iter().enumerate() {
        let code = if i == 0 {
            format!("{} (default)", fiat.code)
        } else {
            fiat.code.to_string()
        };
        table.add_row(vec![
            Cell::new(code),
            Cell::new(format!("{} {}", fiat.display_glyph, fiat.name)),
            Cell::new(fiat.symbol),
        ]);
    }

    table.to_string()
}

pub fn run() {
    println!("{}", display_as_table(FiatOption::all()));
}
