use osteoage::prelude::*;
use std::sync::Arc;

fn main() {
    // Demo stub: synthetic radiograph, fixed estimator, in-code growth rows
    let (w, h) = (256usize, 256usize);
    let mut gray = GrayImage::new(w, h);
    for y in 60..200 {
        for x in 90..170 {
            gray.set(x, y, 190);
        }
    }

    let rows = [
        (Sex::Female, 100.0, 1.0, 132.0, 0.042),
        (Sex::Female, 143.0, 1.0, 152.0, 0.041),
        (Sex::Female, 168.0, 1.0, 158.0, 0.040),
        (Sex::Female, 216.0, 1.0, 161.0, 0.038),
        (Sex::Male, 100.0, 1.0, 134.0, 0.043),
        (Sex::Male, 143.0, 1.0, 153.0, 0.042),
        (Sex::Male, 216.0, 1.0, 174.0, 0.039),
    ];
    let table = GrowthCurveTable::from_rows(rows.into_iter().map(|(sex, month, l, m, s)| {
        osteoage::growth::GrowthCurveRow {
            sex,
            month,
            lms: Lms { l, m, s },
        }
    }));

    let resources = Resources::builder()
        .criteria(Criteria::default())
        .table(table)
        .estimator(Arc::new(ConstantEstimator::new(150.0)))
        .build()
        .unwrap();

    let predictor = Predictor::new(PredictorParams::default());
    let input = PatientInput {
        sex: Sex::Female,
        height_cm: 155.0,
        age_months: 143.0,
        father_height_cm: Some(165.0),
        mother_height_cm: Some(156.0),
    };

    match predictor.process(gray, &input, &resources) {
        Ok(result) => println!("{}", serde_json::to_string_pretty(&result).unwrap()),
        Err(err) => eprintln!("prediction failed: {err}"),
    }
}
