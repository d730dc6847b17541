use adulteration::{logging, Sample, Service};

fn main() -> anyhow::Result<()> {
	logging::init();

	let label = Service::default().predict(&Sample::new(4.2, 8.8, 15000.0, 78.5, 6.7))?;

	println!("Prediction: {}", label);

	Ok(())
}
