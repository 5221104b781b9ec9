use console::Style;
use ptv_core::experiment::Experiment;
use ptv_core::manager::ParameterManager;
use serde_yaml::Value;

struct Styles {
    title: Style,
    label: Style,
    value: Style,
    active: Style,
    path: Style,
    dim: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            active: Style::new().green().bold(),
            path: Style::new().underlined(),
            dim: Style::new().dim(),
        }
    }
}

pub fn print_registry(exp: &Experiment) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Parameter sets"));
    if exp.n_paramsets() == 0 {
        println!("  {}", s.dim.apply_to("(none found)"));
        return;
    }

    for (index, ps) in exp.paramsets().iter().enumerate() {
        let marker = if exp.active_index() == Some(index) {
            s.active.apply_to("*").to_string()
        } else {
            " ".to_string()
        };
        println!(
            "  {} {:<20} {}",
            marker,
            s.value.apply_to(&ps.name),
            s.path.apply_to(ps.yaml_path.display())
        );
    }

    if exp.active_index().is_some() {
        println!();
        println!(
            "  {:<14}{}",
            s.label.apply_to("Cameras"),
            s.value.apply_to(exp.camera_count())
        );
    }
}

pub fn print_document(pm: &ParameterManager) {
    let s = Styles::new();
    let doc = pm.document();

    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Cameras"),
        s.value.apply_to(pm.camera_count())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Splitter"),
        s.value.apply_to(pm.splitter())
    );

    let imx = doc.value("ptv", "imx").and_then(Value::as_i64);
    let imy = doc.value("ptv", "imy").and_then(Value::as_i64);
    if let (Some(imx), Some(imy)) = (imx, imy) {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Image size"),
            s.value.apply_to(format!("{imx}x{imy}"))
        );
    }

    let base_names = pm.base_names();
    if !base_names.is_empty() {
        println!("  {}", s.label.apply_to("Base names"));
        for bn in &base_names {
            println!("    {}", s.path.apply_to(bn));
        }
    }

    println!("  {}", s.label.apply_to("Blocks"));
    for (key, value) in doc.root() {
        if let (Some(name), Some(block)) = (key.as_str(), value.as_mapping()) {
            println!(
                "    {:<12}{}",
                s.value.apply_to(name),
                s.dim.apply_to(format!("{} keys", block.len()))
            );
        }
    }
}
