use super::Context;
use crate::{
    db::users::Users,
    libs::messages::Message,
    msg_info, msg_success,
};
use anyhow::Result;

pub fn cmd(context: &Context) -> Result<()> {
    let user = context.user()?;
    let outcome = Users::with_db(context.db()?).check_in(&user)?;

    if !outcome.checked_in {
        msg_info!(Message::CheckInNeedsCompletion(outcome.streak));
    } else if !outcome.extended {
        msg_success!(Message::StreakStarted(outcome.streak));
    } else {
        msg_success!(Message::StreakExtended(outcome.streak));
    }
    Ok(())
}
