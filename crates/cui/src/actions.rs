use crate::app::App;
use crate::input::InputAction;
use mafia_core::TablePhase;

pub fn dispatch(app: &mut App, action: InputAction) {
    match action {
        InputAction::None => {}
        InputAction::Quit => app.quit(),
        InputAction::ToggleHelp => app.show_help = !app.show_help,
        InputAction::NextFocus => app.cycle_focus(true),
        InputAction::PrevFocus => app.cycle_focus(false),
        InputAction::MoveUp => app.move_cursor(false),
        InputAction::MoveDown => app.move_cursor(true),
        InputAction::MoveLeft => app.move_sideways(false),
        InputAction::MoveRight => app.move_sideways(true),
        InputAction::Toggle => app.toggle_focused(),
        InputAction::Activate => app.activate_primary(),
        InputAction::Back => app.back(),
        InputAction::Day => app.set_table_phase(TablePhase::Day),
        InputAction::Night => app.set_table_phase(TablePhase::Night),
        InputAction::ResetSession => app.reset_session(),
    }
}
