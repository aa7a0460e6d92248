//! Itinerary browsing: `voyage stops` and `voyage stop <id>`.

use voyage_core::itinerary::{Itinerary, Stop};

use crate::app::AppContext;
use crate::cli::{StopArgs, StopsArgs};
use crate::errors::CliError;
use crate::ui::theme::{styled, styles};
use crate::ui::{blank_line, header, hint, kv, simple_table, truncate, Column, OutputMode};

pub fn handle_stops(ctx: &AppContext, args: &StopsArgs) -> anyhow::Result<()> {
    let itinerary = ctx.itinerary()?;
    let stops =
        itinerary.filter_stops(args.query.as_deref().unwrap_or(""), args.country.as_deref());
    let ui_ctx = ctx.ui_context(args.json, None);

    match ui_ctx.mode {
        OutputMode::Json => {
            println!("{}", serde_json::to_string_pretty(&stops)?);
        }
        OutputMode::Pretty => {
            let route = itinerary
                .route()
                .map(|(from, to)| format!("{} \u{2192} {}", from, to));
            println!("{}", header(&ui_ctx, "stops", route.as_deref()));
            blank_line(&ui_ctx);
            if stops.is_empty() {
                println!("No stops match.");
                let countries = itinerary.countries().join(", ");
                println!("{}", hint(&ui_ctx, &format!("Countries: {}", countries)));
                return Ok(());
            }
            let columns = [
                Column::new("#"),
                Column::new("Stop"),
                Column::new("Country"),
                Column::new("Arrive"),
                Column::new("Depart"),
                Column::new("Phase"),
                Column::new("NM"),
            ];
            let rows: Vec<Vec<String>> = stops
                .iter()
                .map(|stop| {
                    vec![
                        stop.id.to_string(),
                        truncate(&stop.name, 28),
                        stop.country.clone(),
                        stop.arrival.clone(),
                        stop.departure.clone(),
                        phase_name(&itinerary, stop),
                        format!("{:.0}", stop.distance_to_next),
                    ]
                })
                .collect();
            println!("{}", simple_table(&ui_ctx, &columns, &rows));
            blank_line(&ui_ctx);
            println!("{}", hint(&ui_ctx, "voyage stop <id>"));
        }
        OutputMode::Plain => {
            if stops.is_empty() {
                println!("count=0");
            }
            for stop in stops {
                println!(
                    "{} {} {} {} {}",
                    stop.id, stop.arrival, stop.departure, stop.country, stop.name
                );
            }
        }
    }
    Ok(())
}

pub fn handle_stop(ctx: &AppContext, args: &StopArgs) -> anyhow::Result<()> {
    let itinerary = ctx.itinerary()?;
    let stop = itinerary.stop(args.id).ok_or_else(|| {
        CliError::not_found(
            format!("Stop not found: {}", args.id),
            "Hint: Run `voyage stops` to list stop IDs.",
        )
    })?;
    let ui_ctx = ctx.ui_context(args.json, None);

    if ui_ctx.mode.is_json() {
        let mut value = serde_json::to_value(stop)?;
        value["phaseInfo"] = serde_json::to_value(itinerary.phase_of(stop))?;
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if ui_ctx.mode.is_pretty() {
        println!("{}", styled(&stop.name, styles::bold(), ui_ctx.color));
    } else {
        println!("{}", kv(&ui_ctx, "Name", &stop.name));
    }
    let id = stop.id.to_string();
    let schengen = if stop.schengen { "yes" } else { "no" };
    let fields: [(&str, Option<&str>); 12] = [
        ("ID", Some(id.as_str())),
        ("Country", Some(stop.country.as_str())),
        ("Type", Some(stop.kind.as_str())),
        ("Arrival", Some(stop.arrival.as_str())),
        ("Departure", Some(stop.departure.as_str())),
        ("Duration", Some(stop.duration.as_str())),
        ("Season", Some(stop.season.as_str())),
        ("Schengen", Some(schengen)),
        ("Marina", stop.marina_name.as_deref()),
        ("Highlight", stop.culture_highlight.as_deref()),
        ("Notes", stop.notes.as_deref()),
        ("Wiki", stop.wiki_url.as_deref()),
    ];
    for (key, value) in fields {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            println!("{}", kv(&ui_ctx, key, value));
        }
    }
    println!("{}", kv(&ui_ctx, "Phase", &phase_name(&itinerary, stop)));
    println!(
        "{}",
        kv(&ui_ctx, "Position", &format!("{:.4}, {:.4}", stop.lat, stop.lon))
    );
    println!(
        "{}",
        kv(
            &ui_ctx,
            "Next leg",
            &format!("{:.1} nm", stop.distance_to_next)
        )
    );
    if ui_ctx.mode.is_pretty() {
        blank_line(&ui_ctx);
        println!(
            "{}",
            hint(&ui_ctx, &format!("voyage list --stop {}", stop.id))
        );
    }
    Ok(())
}

fn phase_name(itinerary: &Itinerary, stop: &Stop) -> String {
    itinerary
        .phase_of(stop)
        .map(|phase| phase.name.clone())
        .unwrap_or_else(|| stop.phase.clone())
}
