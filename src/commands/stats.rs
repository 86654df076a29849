use super::Context;
use crate::{
    libs::{messages::Message, stats::Statistics, view::View},
    msg_print,
};
use anyhow::Result;

pub fn cmd(context: &Context) -> Result<()> {
    let user = context.user()?;
    let db = context.db()?;
    let stats = Statistics::collect(&db.conn, &user, db.clock.today())?;

    msg_print!(Message::StatsHeader, true);
    View::stats(&stats);

    if !stats.categories.is_empty() {
        msg_print!(Message::StatsCategoriesHeader, true);
        View::category_stats(&stats);
    }

    msg_print!(Message::StatsWeekHeader, true);
    View::week_stats(&stats);
    Ok(())
}
